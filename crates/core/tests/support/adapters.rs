//! Scripted provider adapter

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use influlink_core::ProviderAdapter;
use influlink_domain::{
    Credentials, InfluLinkError, ProfileCapabilities, Provider, ProviderProfileFragment,
    Result as DomainResult,
};

/// Grant accepted by [`MockAdapter::exchange`]; anything else is refused.
pub const GOOD_CODE: &str = "good-code";

#[derive(Clone)]
pub struct MockAdapter {
    provider: Provider,
    profile: Option<ProviderProfileFragment>,
    exchanges: Arc<AtomicUsize>,
}

impl MockAdapter {
    /// Adapter whose profile lookup returns `profile`.
    pub fn new(profile: ProviderProfileFragment) -> Self {
        Self { provider: profile.provider, profile: Some(profile), exchanges: Arc::default() }
    }

    /// Adapter whose profile lookup always fails.
    pub fn failing_profile(provider: Provider) -> Self {
        Self { provider, profile: None, exchanges: Arc::default() }
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        access_token: "access-token".into(),
        refresh_token: Some("refresh-token".into()),
        expires_at: None,
        scope: None,
    }
}

/// Fragment shaped like a YouTube channel lookup.
pub fn youtube_fragment(title: &str, channel_id: &str) -> ProviderProfileFragment {
    ProviderProfileFragment {
        external_id: Some(channel_id.into()),
        display_name: Some(title.into()),
        ..ProviderProfileFragment::credentials_only(Provider::Youtube, credentials())
    }
}

/// Fragment shaped like a Twitch `helix/users` lookup.
pub fn twitch_fragment(login: &str) -> ProviderProfileFragment {
    ProviderProfileFragment {
        external_id: Some("141981764".into()),
        display_name: Some(login.to_uppercase()),
        handle: Some(login.into()),
        ..ProviderProfileFragment::credentials_only(Provider::Twitch, credentials())
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn capabilities(&self) -> ProfileCapabilities {
        ProfileCapabilities { handle: true, external_id: true, display_name: true }
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://consent.example.com/{}?state={state}", self.provider)
    }

    async fn exchange(&self, grant: &str) -> DomainResult<Credentials> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if grant == GOOD_CODE {
            Ok(credentials())
        } else {
            Err(InfluLinkError::Auth("invalid_grant".into()))
        }
    }

    async fn fetch_profile(&self, _credentials: &Credentials) -> DomainResult<ProviderProfileFragment> {
        self.profile
            .clone()
            .ok_or_else(|| InfluLinkError::ProfileFetch("lookup failed".into()))
    }
}
