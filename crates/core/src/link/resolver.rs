//! Merging provider profile fragments into influencer documents
//!
//! Only `socialIdentity[provider]` and `isVerified` are ever touched. Writes
//! go through an optimistic version check; a moved version re-reads and
//! re-applies the same change a bounded number of times.

use std::sync::Arc;

use chrono::Utc;
use influlink_domain::{
    Influencer, InfluLinkError, Provider, ProviderProfileFragment, Result, SocialIdentity,
};
use tracing::{debug, warn};

use super::ports::InfluencerRepository;

/// Attempts per read-modify-write before `MergeConflict` surfaces.
pub const MAX_MERGE_ATTEMPTS: u32 = 3;

/// Result of applying a change to an influencer.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    pub influencer: Influencer,
    /// False when the change was a no-op and nothing was written.
    pub changed: bool,
}

/// Compute the patched binding for `fragment` on top of `existing`.
pub fn merge_identity(existing: &SocialIdentity, fragment: &ProviderProfileFragment) -> SocialIdentity {
    let fragment_handle = non_blank(fragment.handle.as_deref())
        .or_else(|| non_blank(fragment.display_name.as_deref()));
    let fragment_external_id = non_blank(fragment.external_id.as_deref());

    let handle = fragment_handle.map_or_else(|| existing.handle.clone(), str::to_string);
    let link_url = non_blank(fragment.link_url.as_deref())
        .map(str::to_string)
        .or_else(|| fragment.provider.profile_url(fragment_handle, fragment_external_id))
        .unwrap_or_else(|| existing.link_url.clone());
    let external_id = fragment_external_id.map_or_else(|| existing.external_id.clone(), str::to_string);

    let mut extra = existing.extra.clone();
    for (key, value) in &fragment.extra {
        if value.is_null() {
            extra.remove(key);
        } else {
            extra.insert(key.clone(), value.clone());
        }
    }

    let verified = existing.verified || (!handle.is_empty() && !link_url.is_empty());

    SocialIdentity {
        verified,
        handle,
        link_url,
        credentials: Some(fragment.credentials.clone()),
        external_id,
        extra,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Loads an influencer, merges a fragment and persists the result.
#[derive(Clone)]
pub struct LinkResolver {
    repository: Arc<dyn InfluencerRepository>,
    max_attempts: u32,
}

impl LinkResolver {
    pub fn new(repository: Arc<dyn InfluencerRepository>) -> Self {
        Self { repository, max_attempts: MAX_MERGE_ATTEMPTS }
    }

    /// Override the retry bound (minimum one attempt).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Merge `fragment` into the influencer's binding for its provider.
    ///
    /// # Errors
    /// `EntityNotFound` when the influencer does not exist, `MergeConflict`
    /// when every attempt lost a concurrent write.
    pub async fn resolve(
        &self,
        influencer_id: &str,
        fragment: &ProviderProfileFragment,
    ) -> Result<LinkOutcome> {
        let provider = fragment.provider;
        self.modify(influencer_id, |influencer| {
            let current = influencer.social_identity.get(provider);
            let patched = merge_identity(current, fragment);
            if patched == *current {
                return Ok(false);
            }
            *influencer.social_identity.get_mut(provider) = patched;
            influencer.recompute_verified();
            Ok(true)
        })
        .await
    }

    /// Clear one provider binding.
    pub async fn disconnect(&self, influencer_id: &str, provider: Provider) -> Result<LinkOutcome> {
        self.modify(influencer_id, |influencer| {
            if influencer.social_identity.get(provider).is_empty() {
                return Ok(false);
            }
            influencer.disconnect(provider);
            Ok(true)
        })
        .await
    }

    /// Optimistic read-modify-write.
    ///
    /// `apply` mutates a copy of the stored document and reports whether
    /// anything changed; unchanged documents are never written.
    pub async fn modify<F>(&self, influencer_id: &str, mut apply: F) -> Result<LinkOutcome>
    where
        F: FnMut(&mut Influencer) -> Result<bool> + Send,
    {
        let mut last_conflict = String::new();

        for attempt in 1..=self.max_attempts {
            let current = self
                .repository
                .get(influencer_id)
                .await?
                .ok_or_else(|| InfluLinkError::EntityNotFound(influencer_id.to_string()))?;

            let mut next = current.clone();
            if !apply(&mut next)? {
                debug!(influencer_id, "no change to persist");
                return Ok(LinkOutcome { influencer: current, changed: false });
            }
            next.updated_at = Utc::now();

            match self.repository.update(next, current.version).await {
                Ok(saved) => return Ok(LinkOutcome { influencer: saved, changed: true }),
                Err(InfluLinkError::MergeConflict(reason)) => {
                    warn!(influencer_id, attempt, %reason, "concurrent write detected, retrying");
                    last_conflict = reason;
                }
                Err(err) => return Err(err),
            }
        }

        Err(InfluLinkError::MergeConflict(format!(
            "influencer {influencer_id} kept changing after {} attempts: {last_conflict}",
            self.max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use influlink_domain::Credentials;
    use serde_json::{json, Value};

    use super::*;

    fn creds(token: &str) -> Credentials {
        Credentials { access_token: token.into(), refresh_token: None, expires_at: None, scope: None }
    }

    fn fragment(provider: Provider) -> ProviderProfileFragment {
        ProviderProfileFragment::credentials_only(provider, creds("at"))
    }

    #[test]
    fn handle_falls_back_to_display_name() {
        let mut f = fragment(Provider::Youtube);
        f.display_name = Some("Acme".into());
        f.external_id = Some("UC123".into());

        let merged = merge_identity(&SocialIdentity::default(), &f);

        assert_eq!(merged.handle, "Acme");
        assert_eq!(merged.link_url, "https://www.youtube.com/channel/UC123");
        assert_eq!(merged.external_id, "UC123");
        assert!(merged.verified);
        assert_eq!(merged.credentials, Some(creds("at")));
    }

    #[test]
    fn explicit_link_wins_over_derived_url() {
        let mut f = fragment(Provider::Instagram);
        f.handle = Some("Jane Doe".into());
        f.link_url = Some("https://www.facebook.com/42".into());

        let merged = merge_identity(&SocialIdentity::default(), &f);
        assert_eq!(merged.link_url, "https://www.facebook.com/42");
    }

    #[test]
    fn credentials_only_fragment_keeps_existing_metadata() {
        let existing = SocialIdentity {
            verified: true,
            handle: "acme".into(),
            link_url: "https://www.twitch.tv/acme".into(),
            credentials: Some(creds("old")),
            external_id: "42".into(),
            extra: BTreeMap::from([("pageId".to_string(), json!("p1"))]),
        };

        let mut f = fragment(Provider::Twitch);
        f.credentials = creds("new");
        f.extra.insert("resolvedVia".into(), json!("login"));

        let merged = merge_identity(&existing, &f);

        assert!(merged.verified);
        assert_eq!(merged.handle, "acme");
        assert_eq!(merged.link_url, "https://www.twitch.tv/acme");
        assert_eq!(merged.credentials, Some(creds("new")));
        assert_eq!(merged.extra.len(), 2);
    }

    fn facebook_only(f: &mut ProviderProfileFragment) {
        f.handle = Some("Jane Doe".into());
        f.link_url = Some("https://www.facebook.com/10001".into());
        f.extra = BTreeMap::from([
            ("facebookOnly".to_string(), json!(true)),
            ("facebookPageId".to_string(), Value::Null),
            ("instagramAccountType".to_string(), Value::Null),
        ]);
    }

    fn business_account(f: &mut ProviderProfileFragment) {
        f.handle = Some("jane.brand".into());
        f.external_id = Some("ig-b".into());
        f.extra = BTreeMap::from([
            ("facebookOnly".to_string(), Value::Null),
            ("facebookPageId".to_string(), json!("p2")),
            ("instagramAccountType".to_string(), json!("business")),
        ]);
    }

    #[test]
    fn relinking_instagram_replaces_account_keys() {
        let mut first = fragment(Provider::Instagram);
        facebook_only(&mut first);
        let mut second = fragment(Provider::Instagram);
        business_account(&mut second);

        let merged = merge_identity(&merge_identity(&SocialIdentity::default(), &first), &second);

        assert_eq!(merged.link_url, "https://www.instagram.com/jane.brand");
        assert!(!merged.extra.contains_key("facebookOnly"));
        assert_eq!(merged.extra["facebookPageId"], "p2");
        assert_eq!(merged.extra["instagramAccountType"], "business");

        let reverted = merge_identity(&merged, &first);
        assert_eq!(reverted.extra["facebookOnly"], true);
        assert!(!reverted.extra.contains_key("facebookPageId"));
        assert!(!reverted.extra.contains_key("instagramAccountType"));
        assert!(reverted.extra.values().all(|v| !v.is_null()));
    }

    #[test]
    fn metadata_less_first_link_stays_unverified() {
        let merged = merge_identity(&SocialIdentity::default(), &fragment(Provider::Tiktok));

        assert!(!merged.verified);
        assert!(merged.handle.is_empty());
        assert!(merged.credentials.is_some());
    }

    #[test]
    fn blank_fields_are_ignored() {
        let existing = SocialIdentity { handle: "keep".into(), ..SocialIdentity::default() };
        let mut f = fragment(Provider::Twitch);
        f.handle = Some("   ".into());
        f.external_id = Some(String::new());

        let merged = merge_identity(&existing, &f);
        assert_eq!(merged.handle, "keep");
        assert_eq!(merged.link_url, "");
        assert!(!merged.verified);
    }
}
