//! Influencer entity and per-provider identity bindings

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::Provider;
use crate::errors::{InfluLinkError, Result};

/// Longest accepted influencer id, in bytes.
pub const MAX_INFLUENCER_ID_LEN: usize = 128;

/// Validate an influencer id (non-empty, no whitespace, bounded length).
pub fn validate_influencer_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(InfluLinkError::InvalidInput("influencer id is empty".into()));
    }
    if id.len() > MAX_INFLUENCER_ID_LEN {
        return Err(InfluLinkError::InvalidInput(format!(
            "influencer id exceeds {MAX_INFLUENCER_ID_LEN} bytes"
        )));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(InfluLinkError::InvalidInput("influencer id contains whitespace".into()));
    }
    Ok(())
}

/// Provider credentials issued by a completed authorization flow.
///
/// Persisted with the binding, never part of any external response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Binding between an influencer and one provider account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialIdentity {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub link_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub external_id: String,
    /// Provider-specific fields kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SocialIdentity {
    /// Whether stats can be gathered for this binding.
    pub fn has_public_handle(&self) -> bool {
        !self.handle.trim().is_empty() || !self.link_url.trim().is_empty()
    }

    /// Whether nothing has ever been recorded for this provider.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The four provider bindings of an influencer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialIdentities {
    #[serde(default)]
    pub youtube: SocialIdentity,
    #[serde(default)]
    pub instagram: SocialIdentity,
    #[serde(default)]
    pub twitch: SocialIdentity,
    #[serde(default)]
    pub tiktok: SocialIdentity,
}

impl SocialIdentities {
    pub fn get(&self, provider: Provider) -> &SocialIdentity {
        match provider {
            Provider::Youtube => &self.youtube,
            Provider::Instagram => &self.instagram,
            Provider::Twitch => &self.twitch,
            Provider::Tiktok => &self.tiktok,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut SocialIdentity {
        match provider {
            Provider::Youtube => &mut self.youtube,
            Provider::Instagram => &mut self.instagram,
            Provider::Twitch => &mut self.twitch,
            Provider::Tiktok => &mut self.tiktok,
        }
    }

    /// Iterate `(provider, binding)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (Provider, &SocialIdentity)> {
        Provider::ALL.into_iter().map(move |provider| (provider, self.get(provider)))
    }

    pub fn any_verified(&self) -> bool {
        self.iter().any(|(_, identity)| identity.verified)
    }
}

/// Influencer document as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub social_identity: SocialIdentities,
    #[serde(default)]
    pub is_verified: bool,
    /// Optimistic concurrency counter, bumped by every persisted write.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Influencer {
    /// Create a fresh, unlinked influencer.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            social_identity: SocialIdentities::default(),
            is_verified: false,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the global flag from the bindings.
    pub fn recompute_verified(&mut self) {
        self.is_verified = self.social_identity.any_verified();
    }

    /// Clear one binding entirely. Other providers are untouched.
    pub fn disconnect(&mut self, provider: Provider) {
        *self.social_identity.get_mut(provider) = SocialIdentity::default();
        self.recompute_verified();
    }

    /// Providers that carry a public handle or link, with their bindings.
    pub fn public_handles(&self) -> impl Iterator<Item = (Provider, &SocialIdentity)> {
        self.social_identity.iter().filter(|(_, identity)| identity.has_public_handle())
    }

    /// Credential-free view for external callers.
    pub fn public_view(&self) -> InfluencerView {
        let social_identity = self
            .social_identity
            .iter()
            .map(|(provider, identity)| {
                (
                    provider,
                    SocialIdentityView {
                        verified: identity.verified,
                        handle: identity.handle.clone(),
                        link_url: identity.link_url.clone(),
                        external_id: identity.external_id.clone(),
                    },
                )
            })
            .collect();

        InfluencerView {
            id: self.id.clone(),
            name: self.name.clone(),
            social_identity,
            is_verified: self.is_verified,
            updated_at: self.updated_at,
        }
    }
}

/// Public projection of a binding. Has no credentials field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialIdentityView {
    pub verified: bool,
    pub handle: String,
    pub link_url: String,
    pub external_id: String,
}

/// Public projection of an influencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerView {
    pub id: String,
    pub name: String,
    pub social_identity: BTreeMap<Provider, SocialIdentityView>,
    pub is_verified: bool,
    pub updated_at: DateTime<Utc>,
}
