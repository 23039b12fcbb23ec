//! YouTube (Google OAuth) adapter

use async_trait::async_trait;
use influlink_common::OAuthClient;
use influlink_core::ProviderAdapter;
use influlink_domain::{
    Credentials, InfluLinkError, OAuthClientConfig, ProfileCapabilities, Provider,
    ProviderProfileFragment, Result,
};
use serde::Deserialize;

use super::{exchange_code, fetch_profile_json, AdapterSettings, Endpoints};
use crate::http::HttpClient;

const ENDPOINTS: Endpoints = Endpoints {
    authorize: "https://accounts.google.com/o/oauth2/v2/auth",
    token: "https://oauth2.googleapis.com/token",
    api_base: "https://www.googleapis.com/youtube/v3",
    scopes: &["https://www.googleapis.com/auth/youtube.readonly"],
};

pub struct YoutubeAdapter {
    oauth: OAuthClient,
    http: HttpClient,
    api_base: String,
}

impl YoutubeAdapter {
    pub fn new(client: &OAuthClientConfig, redirect_uri: String, http: HttpClient) -> Self {
        let settings = AdapterSettings::new(client, &ENDPOINTS, redirect_uri);
        // Offline access so Google issues a refresh token on every consent.
        let config = settings
            .oauth
            .with_authorize_param("access_type", "offline")
            .with_authorize_param("prompt", "consent");

        Self {
            oauth: OAuthClient::with_http_client(config, http.inner().clone()),
            http,
            api_base: settings.api_base,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelList {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    custom_url: Option<String>,
}

#[async_trait]
impl ProviderAdapter for YoutubeAdapter {
    fn provider(&self) -> Provider {
        Provider::Youtube
    }

    fn capabilities(&self) -> ProfileCapabilities {
        ProfileCapabilities { handle: true, external_id: true, display_name: true }
    }

    fn authorization_url(&self, state: &str) -> String {
        self.oauth.authorization_url(state)
    }

    async fn exchange(&self, grant: &str) -> Result<Credentials> {
        exchange_code(&self.oauth, grant).await
    }

    async fn fetch_profile(&self, credentials: &Credentials) -> Result<ProviderProfileFragment> {
        let request = self
            .http
            .get(format!("{}/channels", self.api_base))
            .query(&[("part", "snippet"), ("mine", "true")])
            .bearer_auth(&credentials.access_token);

        let list: ChannelList = fetch_profile_json(&self.http, Provider::Youtube, request).await?;
        let channel = list
            .items
            .into_iter()
            .next()
            .ok_or_else(|| InfluLinkError::ProfileFetch("account has no YouTube channel".into()))?;

        Ok(ProviderProfileFragment {
            external_id: Some(channel.id),
            display_name: channel.snippet.title.filter(|t| !t.trim().is_empty()),
            handle: channel.snippet.custom_url.filter(|h| !h.trim().is_empty()),
            ..ProviderProfileFragment::credentials_only(Provider::Youtube, credentials.clone())
        })
    }
}
