//! Port interfaces for statistics sources

use async_trait::async_trait;
use influlink_domain::{Provider, SocialIdentity, StatsFragment, StatsSourceError};

/// Public account coordinates handed to a statistics source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatsTarget {
    pub provider: Provider,
    pub handle: String,
    pub link_url: String,
    pub external_id: String,
}

impl StatsTarget {
    pub fn from_identity(provider: Provider, identity: &SocialIdentity) -> Self {
        Self {
            provider,
            handle: identity.handle.trim().to_string(),
            link_url: identity.link_url.trim().to_string(),
            external_id: identity.external_id.trim().to_string(),
        }
    }

    /// Handle without a leading `@`, if any.
    pub fn bare_handle(&self) -> Option<&str> {
        Some(influlink_domain::strip_at(&self.handle)).filter(|h| !h.is_empty())
    }

    /// Stable key identifying the account: handle, else link.
    pub fn seed_key(&self) -> &str {
        if self.handle.is_empty() {
            &self.link_url
        } else {
            &self.handle
        }
    }
}

/// One live statistics provider.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Provider this source reports on
    fn provider(&self) -> Provider;

    /// Short source name for logs (`youtube_data_api`, `tiktok_scrape`, ...)
    fn name(&self) -> &'static str;

    /// Fetch live statistics for one account
    async fn fetch(&self, target: &StatsTarget) -> Result<StatsFragment, StatsSourceError>;
}
