//! Twitch adapter

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
    authorize: "https://id.twitch.tv/oauth2/authorize",
    token: "https://id.twitch.tv/oauth2/token",
    api_base: "https://api.twitch.tv/helix",
    scopes: &["user:read:email"],
};

pub struct TwitchAdapter {
    oauth: OAuthClient,
    http: HttpClient,
    api_base: String,
    client_id: String,
}

impl TwitchAdapter {
    pub fn new(client: &OAuthClientConfig, redirect_uri: String, http: HttpClient) -> Self {
        let settings = AdapterSettings::new(client, &ENDPOINTS, redirect_uri);
        let client_id = settings.oauth.client_id.clone();

        Self {
            oauth: OAuthClient::with_http_client(settings.oauth, http.inner().clone()),
            http,
            api_base: settings.api_base,
            client_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    data: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    login: String,
    display_name: Option<String>,
}

#[async_trait]
impl ProviderAdapter for TwitchAdapter {
    fn provider(&self) -> Provider {
        Provider::Twitch
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
            .get(format!("{}/users", self.api_base))
            .bearer_auth(&credentials.access_token)
            .header("Client-Id", &self.client_id);

        let users: UserList = fetch_profile_json(&self.http, Provider::Twitch, request).await?;
        let user = users
            .data
            .into_iter()
            .next()
            .ok_or_else(|| InfluLinkError::ProfileFetch("twitch returned no user".into()))?;

        Ok(ProviderProfileFragment {
            external_id: Some(user.id),
            display_name: user.display_name,
            handle: Some(user.login),
            ..ProviderProfileFragment::credentials_only(Provider::Twitch, credentials.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::mock_client;
    use super::*;

    #[tokio::test]
    async fn exchange_accepts_array_scope_and_fetches_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tw-token",
                "refresh_token": "tw-refresh",
                "expires_in": 14_000,
                "scope": ["user:read:email"],
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("client-id", "client-id"))
            .and(header("authorization", "Bearer tw-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "141981764", "login": "acme_live", "display_name": "Acme_Live"}]
            })))
            .mount(&server)
            .await;

        let adapter = TwitchAdapter::new(
            &mock_client(&server.uri()),
            "http://localhost:8080/auth/twitch/callback".into(),
            HttpClient::new().unwrap(),
        );

        let credentials = adapter.exchange("good-code").await.unwrap();
        assert_eq!(credentials.scope.as_deref(), Some("user:read:email"));

        let fragment = adapter.fetch_profile(&credentials).await.unwrap();
        assert_eq!(fragment.handle.as_deref(), Some("acme_live"));
        assert_eq!(fragment.display_name.as_deref(), Some("Acme_Live"));
        assert_eq!(fragment.external_id.as_deref(), Some("141981764"));
    }
}
