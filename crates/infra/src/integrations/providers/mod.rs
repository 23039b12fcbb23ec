//! OAuth provider adapters
//!
//! One adapter per [`Provider`]; each wraps the shared [`OAuthClient`] for
//! the grant exchange and calls the provider's own API for the profile.
//! Only providers with a complete client registration are registered.

pub mod facebook;
pub mod tiktok;
pub mod twitch;
pub mod youtube;

use std::sync::Arc;

use influlink_common::{OAuthClient, OAuthConfig, TokenSet};
use influlink_core::ProviderRegistry;
use influlink_domain::{Config, Credentials, InfluLinkError, OAuthClientConfig, Provider, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

pub use facebook::FacebookAdapter;
pub use tiktok::TiktokAdapter;
pub use twitch::TwitchAdapter;
pub use youtube::YoutubeAdapter;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Provider defaults, overridable per endpoint in configuration.
pub(crate) struct Endpoints {
    pub authorize: &'static str,
    pub token: &'static str,
    pub api_base: &'static str,
    pub scopes: &'static [&'static str],
}

/// Resolved settings shared by every adapter.
pub(crate) struct AdapterSettings {
    pub oauth: OAuthConfig,
    pub api_base: String,
}

impl AdapterSettings {
    pub fn new(client: &OAuthClientConfig, defaults: &Endpoints, redirect_uri: String) -> Self {
        let scopes = client
            .scopes
            .clone()
            .unwrap_or_else(|| defaults.scopes.iter().map(|s| (*s).to_string()).collect());

        let oauth = OAuthConfig::new(
            client.authorization_endpoint.as_deref().unwrap_or(defaults.authorize),
            client.token_endpoint.as_deref().unwrap_or(defaults.token),
            client.client_id.trim(),
            client.client_secret.trim(),
            redirect_uri,
            scopes,
        );

        let api_base =
            client.api_base_url.as_deref().unwrap_or(defaults.api_base).trim_end_matches('/').to_string();

        Self { oauth, api_base }
    }
}

/// Callback URL registered with the provider for this deployment.
pub fn redirect_uri(public_base_url: &str, provider: Provider) -> String {
    format!("{}/auth/{}/callback", public_base_url.trim_end_matches('/'), provider.route_segment())
}

/// Convert an OAuth token set into stored credentials.
pub fn credentials_from(tokens: TokenSet) -> Credentials {
    Credentials {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at: tokens.expires_at,
        scope: tokens.scope,
    }
}

/// Code exchange shared by every adapter; refusals surface as `Auth`.
pub(crate) async fn exchange_code(oauth: &OAuthClient, grant: &str) -> Result<Credentials> {
    oauth
        .exchange_code(grant)
        .await
        .map(credentials_from)
        .map_err(|err| InfluLinkError::from(InfraError::from(err)))
}

/// Profile API call; every failure is a non-fatal `ProfileFetch`.
pub(crate) async fn fetch_profile_json<T: DeserializeOwned>(
    http: &HttpClient,
    provider: Provider,
    request: RequestBuilder,
) -> Result<T> {
    http.fetch_json(request)
        .await
        .map_err(|err| InfluLinkError::ProfileFetch(format!("{provider} profile lookup failed: {err}")))
}

/// Build the registry from configuration.
///
/// Providers without both a client id and a secret stay unregistered, so
/// any attempt to use them fails with `ProviderNotConfigured`.
pub fn build_provider_registry(config: &Config, http: &HttpClient) -> ProviderRegistry {
    let base = config.server.public_base_url.as_str();
    let providers = &config.providers;
    let mut registry = ProviderRegistry::new();

    if let Some(client) = usable(providers.youtube.as_ref(), Provider::Youtube) {
        registry.register(Arc::new(YoutubeAdapter::new(client, redirect_uri(base, Provider::Youtube), http.clone())));
    }
    if let Some(client) = usable(providers.facebook.as_ref(), Provider::Instagram) {
        registry.register(Arc::new(FacebookAdapter::new(
            client,
            redirect_uri(base, Provider::Instagram),
            http.clone(),
        )));
    }
    if let Some(client) = usable(providers.twitch.as_ref(), Provider::Twitch) {
        registry.register(Arc::new(TwitchAdapter::new(client, redirect_uri(base, Provider::Twitch), http.clone())));
    }
    if let Some(client) = usable(providers.tiktok.as_ref(), Provider::Tiktok) {
        registry.register(Arc::new(TiktokAdapter::new(client, redirect_uri(base, Provider::Tiktok), http.clone())));
    }

    info!(providers = ?registry, "provider registry built");
    registry
}

/// Client registration pointing every endpoint at a mock server.
#[cfg(test)]
pub(crate) fn mock_client(server_uri: &str) -> OAuthClientConfig {
    OAuthClientConfig {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        authorization_endpoint: Some(format!("{server_uri}/authorize")),
        token_endpoint: Some(format!("{server_uri}/token")),
        api_base_url: Some(server_uri.to_string()),
        scopes: None,
    }
}

fn usable(client: Option<&OAuthClientConfig>, provider: Provider) -> Option<&OAuthClientConfig> {
    let client = client?;
    if client.is_complete() {
        Some(client)
    } else {
        warn!(%provider, "incomplete OAuth client registration, provider disabled");
        None
    }
}
