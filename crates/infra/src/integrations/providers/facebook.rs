//! Instagram via Facebook Login
//!
//! Instagram professional accounts are reachable only through the Facebook
//! Pages they are attached to. Every page is scanned for a business account
//! before any connected (creator) account is considered. An account without
//! a username in the page payload costs one extra lookup. A Facebook user
//! with no Instagram account at all still links, under their Facebook
//! identity.

use std::collections::BTreeMap;

use async_trait::async_trait;
use influlink_common::OAuthClient;
use influlink_core::ProviderAdapter;
use influlink_domain::{
    Credentials, OAuthClientConfig, ProfileCapabilities, Provider, ProviderProfileFragment, Result,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{exchange_code, fetch_profile_json, AdapterSettings, Endpoints};
use crate::http::HttpClient;

const ENDPOINTS: Endpoints = Endpoints {
    authorize: "https://www.facebook.com/v19.0/dialog/oauth",
    token: "https://graph.facebook.com/v19.0/oauth/access_token",
    api_base: "https://graph.facebook.com/v19.0",
    scopes: &["public_profile", "pages_show_list", "pages_read_engagement", "instagram_basic"],
};

const PAGE_FIELDS: &str =
    "id,name,instagram_business_account{id,username},connected_instagram_account{id,username}";

/// Upper bound on `/me/accounts` pages followed.
const MAX_PAGE_REQUESTS: usize = 10;

pub struct FacebookAdapter {
    oauth: OAuthClient,
    http: HttpClient,
    api_base: String,
}

impl FacebookAdapter {
    pub fn new(client: &OAuthClientConfig, redirect_uri: String, http: HttpClient) -> Self {
        let settings = AdapterSettings::new(client, &ENDPOINTS, redirect_uri);
        let config = settings.oauth.with_scope_separator(",");

        Self {
            oauth: OAuthClient::with_http_client(config, http.inner().clone()),
            http,
            api_base: settings.api_base,
        }
    }

    async fn pages(&self, access_token: &str) -> Result<Vec<Page>> {
        let mut pages = Vec::new();
        let mut request = self
            .http
            .get(format!("{}/me/accounts", self.api_base))
            .query(&[("fields", PAGE_FIELDS)])
            .bearer_auth(access_token);

        for _ in 0..MAX_PAGE_REQUESTS {
            let batch: PageList = fetch_profile_json(&self.http, Provider::Instagram, request).await?;
            pages.extend(batch.data);

            match batch.paging.and_then(|p| p.next) {
                Some(next) => request = self.http.get(next).bearer_auth(access_token),
                None => break,
            }
        }

        Ok(pages)
    }

    async fn username(&self, account_id: &str, access_token: &str) -> Result<Option<String>> {
        let request = self
            .http
            .get(format!("{}/{account_id}", self.api_base))
            .query(&[("fields", "username")])
            .bearer_auth(access_token);

        let account: InstagramAccount =
            fetch_profile_json(&self.http, Provider::Instagram, request).await?;
        Ok(account.username)
    }
}

#[derive(Debug, Deserialize)]
struct FacebookUser {
    id: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageList {
    #[serde(default)]
    data: Vec<Page>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    id: String,
    instagram_business_account: Option<InstagramAccount>,
    connected_instagram_account: Option<InstagramAccount>,
}

#[derive(Debug, Clone, Deserialize)]
struct InstagramAccount {
    id: String,
    username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountKind {
    Business,
    Connected,
}

impl AccountKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Connected => "connected",
        }
    }
}

/// Business accounts on any page win over connected accounts.
fn select_account(pages: &[Page]) -> Option<(&Page, &InstagramAccount, AccountKind)> {
    pages
        .iter()
        .find_map(|p| p.instagram_business_account.as_ref().map(|a| (p, a, AccountKind::Business)))
        .or_else(|| {
            pages.iter().find_map(|p| {
                p.connected_instagram_account.as_ref().map(|a| (p, a, AccountKind::Connected))
            })
        })
}

#[async_trait]
impl ProviderAdapter for FacebookAdapter {
    fn provider(&self) -> Provider {
        Provider::Instagram
    }

    fn capabilities(&self) -> ProfileCapabilities {
        // Instagram accounts reached through a page carry no display name.
        ProfileCapabilities { handle: true, external_id: true, display_name: false }
    }

    fn authorization_url(&self, state: &str) -> String {
        self.oauth.authorization_url(state)
    }

    async fn exchange(&self, grant: &str) -> Result<Credentials> {
        exchange_code(&self.oauth, grant).await
    }

    async fn fetch_profile(&self, credentials: &Credentials) -> Result<ProviderProfileFragment> {
        let token = credentials.access_token.as_str();

        let me_request = self
            .http
            .get(format!("{}/me", self.api_base))
            .query(&[("fields", "id,name")])
            .bearer_auth(token);
        let me: FacebookUser = fetch_profile_json(&self.http, Provider::Instagram, me_request).await?;

        let pages = self.pages(token).await?;
        let mut extra = BTreeMap::from([("facebookUserId".to_string(), Value::from(me.id.clone()))]);

        let Some((page, account, kind)) = select_account(&pages) else {
            debug!(pages = pages.len(), "no instagram account attached, linking facebook identity");
            extra.insert("facebookOnly".to_string(), Value::Bool(true));
            extra.insert("facebookPageId".to_string(), Value::Null);
            extra.insert("instagramAccountType".to_string(), Value::Null);
            return Ok(ProviderProfileFragment {
                external_id: Some(me.id.clone()),
                display_name: me.name.clone(),
                handle: me.name.filter(|n| !n.trim().is_empty()),
                link_url: Some(format!("https://www.facebook.com/{}", me.id)),
                extra,
                ..ProviderProfileFragment::credentials_only(Provider::Instagram, credentials.clone())
            });
        };

        let username = match account.username.clone().filter(|u| !u.trim().is_empty()) {
            Some(username) => Some(username),
            None => self.username(&account.id, token).await?,
        };

        extra.insert("facebookOnly".to_string(), Value::Null);
        extra.insert("facebookPageId".to_string(), Value::from(page.id.clone()));
        extra.insert("instagramAccountType".to_string(), Value::from(kind.as_str()));

        Ok(ProviderProfileFragment {
            external_id: Some(account.id.clone()),
            display_name: None,
            handle: username,
            extra,
            ..ProviderProfileFragment::credentials_only(Provider::Instagram, credentials.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::mock_client;
    use super::*;

    fn adapter(server: &MockServer) -> FacebookAdapter {
        FacebookAdapter::new(
            &mock_client(&server.uri()),
            "http://localhost:8080/auth/facebook/callback".into(),
            HttpClient::new().unwrap(),
        )
    }

    fn credentials() -> Credentials {
        Credentials { access_token: "EAAB".into(), refresh_token: None, expires_at: None, scope: None }
    }

    async fn mount_me(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "10001", "name": "Jane Doe"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn business_account_on_later_page_beats_connected_account() {
        let server = MockServer::start().await;
        mount_me(&server).await;
        Mock::given(method("GET"))
            .and(path("/me/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "p1", "connected_instagram_account": {"id": "ig-c", "username": "jane.creator"}}
                ],
                "paging": {"next": format!("{}/me/accounts/page2", server.uri())}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/accounts/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "p2", "instagram_business_account": {"id": "ig-b"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ig-b"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "ig-b", "username": "jane.brand"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fragment = adapter(&server).fetch_profile(&credentials()).await.unwrap();

        assert_eq!(fragment.provider, Provider::Instagram);
        assert_eq!(fragment.external_id.as_deref(), Some("ig-b"));
        assert_eq!(fragment.handle.as_deref(), Some("jane.brand"));
        assert_eq!(fragment.extra["instagramAccountType"], "business");
        assert_eq!(fragment.extra["facebookPageId"], "p2");
    }

    #[tokio::test]
    async fn connected_account_used_when_no_page_has_business_account() {
        let server = MockServer::start().await;
        mount_me(&server).await;
        Mock::given(method("GET"))
            .and(path("/me/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "p1"},
                    {"id": "p2", "connected_instagram_account": {"id": "ig-c", "username": "jane.creator"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ig-c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ig-c"})))
            .expect(0)
            .mount(&server)
            .await;

        let fragment = adapter(&server).fetch_profile(&credentials()).await.unwrap();

        assert_eq!(fragment.external_id.as_deref(), Some("ig-c"));
        assert_eq!(fragment.handle.as_deref(), Some("jane.creator"));
        assert_eq!(fragment.extra["instagramAccountType"], "connected");
        assert_eq!(fragment.extra["facebookPageId"], "p2");
        assert!(fragment.extra["facebookOnly"].is_null());
    }

    #[tokio::test]
    async fn no_instagram_account_links_facebook_identity() {
        let server = MockServer::start().await;
        mount_me(&server).await;
        Mock::given(method("GET"))
            .and(path("/me/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "p1"}]})))
            .mount(&server)
            .await;

        let fragment = adapter(&server).fetch_profile(&credentials()).await.unwrap();

        assert_eq!(fragment.handle.as_deref(), Some("Jane Doe"));
        assert_eq!(fragment.link_url.as_deref(), Some("https://www.facebook.com/10001"));
        assert_eq!(fragment.extra["facebookOnly"], true);
        assert!(fragment.extra["instagramAccountType"].is_null());
    }

    #[tokio::test]
    async fn graph_error_is_profile_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Invalid OAuth access token.", "code": 190}
            })))
            .mount(&server)
            .await;

        let result = adapter(&server).fetch_profile(&credentials()).await;
        assert!(matches!(result, Err(influlink_domain::InfluLinkError::ProfileFetch(_))));
    }

    #[tokio::test]
    async fn scopes_are_comma_separated() {
        let server = MockServer::start().await;
        let url = adapter(&server).authorization_url("s");
        assert!(url.contains("scope=public_profile%2Cpages_show_list"));
    }
}
