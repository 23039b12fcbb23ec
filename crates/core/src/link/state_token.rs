//! Correlation state carried through the provider redirect
//!
//! A token is `base64url(influencer_id) "." hex(tag)`, where `tag` is the
//! first 8 bytes of a BLAKE3 keyed hash of the id. The id stays recoverable;
//! the tag makes sure a tampered or truncated token never decodes to a
//! different influencer. Tokens carry no other claims and are not
//! authentication.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use influlink_domain::{validate_influencer_id, InfluLinkError, Result};
use rand::RngCore;
use tracing::warn;

const KEY_CONTEXT: &str = "influlink 2024 oauth state token v1";
const TAG_LEN: usize = 8;

/// Encodes and decodes state tokens under one process-wide key.
#[derive(Clone)]
pub struct StateTokenCodec {
    key: [u8; 32],
}

impl std::fmt::Debug for StateTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTokenCodec").finish_non_exhaustive()
    }
}

impl StateTokenCodec {
    /// Derive the key from a configured secret.
    pub fn new(secret: &str) -> Self {
        Self { key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()) }
    }

    /// Random key; tokens do not survive a restart.
    pub fn ephemeral() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Use the configured secret when present, else an ephemeral key.
    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret.map(str::trim).filter(|s| !s.is_empty()) {
            Some(secret) => Self::new(secret),
            None => {
                warn!("no state secret configured; using a per-process key, pending authorization flows will not survive a restart");
                Self::ephemeral()
            }
        }
    }

    pub fn encode(&self, influencer_id: &str) -> String {
        format!("{}.{}", URL_SAFE_NO_PAD.encode(influencer_id), hex::encode(self.tag(influencer_id)))
    }

    /// Recover the influencer id.
    ///
    /// # Errors
    /// `InfluLinkError::Decode` for any malformed, truncated or tampered
    /// token.
    pub fn decode(&self, token: &str) -> Result<String> {
        let (payload, tag) = token.trim().split_once('.').ok_or_else(InfluLinkError::corrupt_state)?;

        let raw = URL_SAFE_NO_PAD.decode(payload).map_err(|_| InfluLinkError::corrupt_state())?;
        let influencer_id = String::from_utf8(raw).map_err(|_| InfluLinkError::corrupt_state())?;
        validate_influencer_id(&influencer_id).map_err(|_| InfluLinkError::corrupt_state())?;

        let tag = hex::decode(tag).map_err(|_| InfluLinkError::corrupt_state())?;
        if tag.len() != TAG_LEN || !constant_time_eq(&tag, &self.tag(&influencer_id)) {
            return Err(InfluLinkError::corrupt_state());
        }

        Ok(influencer_id)
    }

    fn tag(&self, influencer_id: &str) -> [u8; TAG_LEN] {
        let hash = blake3::keyed_hash(&self.key, influencer_id.as_bytes());
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&hash.as_bytes()[..TAG_LEN]);
        tag
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
