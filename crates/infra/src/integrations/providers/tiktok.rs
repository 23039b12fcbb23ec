//! TikTok Login Kit adapter
//!
//! TikTok names the client identifier `client_key` and joins scopes with
//! commas. Its user info endpoint reports failures inside a 200 body.

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
    authorize: "https://www.tiktok.com/v2/auth/authorize/",
    token: "https://open.tiktokapis.com/v2/oauth/token/",
    api_base: "https://open.tiktokapis.com/v2",
    scopes: &["user.info.basic", "user.info.profile"],
};

const USER_FIELDS: &str = "open_id,union_id,display_name,username";

pub struct TiktokAdapter {
    oauth: OAuthClient,
    http: HttpClient,
    api_base: String,
}

impl TiktokAdapter {
    pub fn new(client: &OAuthClientConfig, redirect_uri: String, http: HttpClient) -> Self {
        let settings = AdapterSettings::new(client, &ENDPOINTS, redirect_uri);
        let config = settings.oauth.with_client_id_param("client_key").with_scope_separator(",");

        Self {
            oauth: OAuthClient::with_http_client(config, http.inner().clone()),
            http,
            api_base: settings.api_base,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    data: Option<UserInfoData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    open_id: Option<String>,
    display_name: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl ProviderAdapter for TiktokAdapter {
    fn provider(&self) -> Provider {
        Provider::Tiktok
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
            .get(format!("{}/user/info/", self.api_base))
            .query(&[("fields", USER_FIELDS)])
            .bearer_auth(&credentials.access_token);

        let response: UserInfoResponse = fetch_profile_json(&self.http, Provider::Tiktok, request).await?;

        if let Some(error) = response.error.filter(|e| e.code != "ok") {
            return Err(InfluLinkError::ProfileFetch(format!(
                "tiktok user info failed: {} {}",
                error.code, error.message
            )));
        }

        let user = response
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| InfluLinkError::ProfileFetch("tiktok returned no user".into()))?;

        let display_name = user.display_name.filter(|n| !n.trim().is_empty());
        let handle = user.username.filter(|u| !u.trim().is_empty()).or_else(|| display_name.clone());

        Ok(ProviderProfileFragment {
            external_id: user.open_id,
            display_name,
            handle,
            ..ProviderProfileFragment::credentials_only(Provider::Tiktok, credentials.clone())
        })
    }
}
