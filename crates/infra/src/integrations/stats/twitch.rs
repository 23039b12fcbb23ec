//! Twitch Helix follower counts
//!
//! Uses an app access token from the client-credentials grant, cached until
//! shortly before expiry. A 401 drops the cached token so the next fetch
//! requests a fresh one.

use async_trait::async_trait;
use influlink_common::{OAuthClient, OAuthConfig, TokenSet};
use influlink_core::{StatsSource, StatsTarget};
use influlink_domain::{quality_score, OAuthClientConfig, Provider, StatsFragment, StatsSourceError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::source_error;
use crate::http::{FetchError, HttpClient};

const DEFAULT_API_BASE: &str = "https://api.twitch.tv/helix";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://id.twitch.tv/oauth2/token";
const SOURCE: &str = "twitch_helix";
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct TwitchStatsSource {
    http: HttpClient,
    oauth: OAuthClient,
    client_id: String,
    api_base: String,
    token: Mutex<Option<TokenSet>>,
}

impl TwitchStatsSource {
    pub fn new(
        http: HttpClient,
        client: &OAuthClientConfig,
        api_base: Option<String>,
        token_endpoint: Option<String>,
    ) -> Self {
        let config = OAuthConfig::new(
            "",
            token_endpoint
                .or_else(|| client.token_endpoint.clone())
                .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string()),
            client.client_id.trim(),
            client.client_secret.trim(),
            "",
            Vec::new(),
        );

        Self {
            oauth: OAuthClient::with_http_client(config, http.inner().clone()),
            http,
            client_id: client.client_id.trim().to_string(),
            api_base: api_base.as_deref().unwrap_or(DEFAULT_API_BASE).trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    async fn app_token(&self) -> Result<String, StatsSourceError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| !t.is_expired(EXPIRY_MARGIN_SECS)) {
            return Ok(token.access_token.clone());
        }

        let tokens = self
            .oauth
            .client_credentials()
            .await
            .map_err(|err| StatsSourceError::Unavailable(format!("{SOURCE}: app token: {err}")))?;
        debug!(expires_in = tokens.expires_in, "twitch app token issued");

        let access_token = tokens.access_token.clone();
        *slot = Some(tokens);
        Ok(access_token)
    }

    async fn helix<T: DeserializeOwned>(
        &self,
        token: &str,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StatsSourceError> {
        let request = self
            .http
            .get(format!("{}/{endpoint}", self.api_base))
            .query(query)
            .bearer_auth(token)
            .header("Client-Id", &self.client_id);

        match self.http.fetch_json(request).await {
            Ok(body) => Ok(body),
            Err(err @ FetchError::Status { status: StatusCode::UNAUTHORIZED, .. }) => {
                self.token.lock().await.take();
                Err(source_error(SOURCE, err))
            }
            Err(err) => Err(source_error(SOURCE, err)),
        }
    }
}

/// Login from the handle, else the last path segment of the link.
fn login_for(target: &StatsTarget) -> Option<String> {
    target
        .bare_handle()
        .map(str::to_string)
        .or_else(|| {
            let path = target.link_url.split("twitch.tv/").nth(1)?;
            path.split(['/', '?', '#']).next().map(str::to_string)
        })
        .map(|login| login.to_ascii_lowercase())
        .filter(|login| !login.is_empty())
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    data: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Followers {
    total: u64,
}

#[async_trait]
impl StatsSource for TwitchStatsSource {
    fn provider(&self) -> Provider {
        Provider::Twitch
    }

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, target: &StatsTarget) -> Result<StatsFragment, StatsSourceError> {
        let login = login_for(target)
            .ok_or_else(|| StatsSourceError::NotFound(format!("{SOURCE}: no login")))?;
        let token = self.app_token().await?;

        let users: UserList = self.helix(&token, "users", &[("login", login.as_str())]).await?;
        let user = users
            .data
            .into_iter()
            .next()
            .ok_or_else(|| StatsSourceError::NotFound(format!("{SOURCE}: no user {login}")))?;

        let followers: Followers =
            self.helix(&token, "channels/followers", &[("broadcaster_id", user.id.as_str())]).await?;

        let mut fragment = StatsFragment::live(Provider::Twitch, followers.total);
        fragment.quality_score = Some(quality_score(followers.total, None));
        Ok(fragment)
    }
}
