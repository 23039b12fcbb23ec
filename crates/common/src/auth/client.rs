//! OAuth 2.0 client for server-side authorization-code flows
//!
//! Handles:
//! - Authorization URL building around a caller-supplied `state`
//! - Authorization code exchange
//! - Client-credentials (app token) grants

use std::time::Duration;

use reqwest::Client;

use super::types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed
    RequestFailed(reqwest::Error),

    /// OAuth server returned a standard error payload
    OAuthError(OAuthError),

    /// OAuth server returned a non-success status without a parsable error
    Status { status: u16, body: String },

    /// Failed to parse response
    ParseError(String),

    /// Invalid configuration
    ConfigError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::OAuthError(e) => write!(f, "OAuth error: {e}"),
            Self::Status { status, body } => write!(f, "token endpoint returned {status}: {body}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.0 confidential client
///
/// Implements the RFC 6749 authorization-code and client-credentials grants
/// with the client secret sent in the form body, which every supported
/// provider accepts.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with its own HTTP connection pool.
    ///
    /// # Examples
    /// ```
    /// use influlink_common::auth::{OAuthClient, OAuthConfig};
    ///
    /// let config = OAuthConfig::new(
    ///     "https://id.twitch.tv/oauth2/authorize",
    ///     "https://id.twitch.tv/oauth2/token",
    ///     "client_id",
    ///     "client_secret",
    ///     "http://localhost:8080/auth/twitch/callback",
    ///     vec!["user:read:email".to_string()],
    /// );
    /// let client = OAuthClient::new(config);
    /// assert!(client.authorization_url("opaque").contains("state=opaque"));
    /// ```
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(config, client)
    }

    /// Create a client sharing an existing connection pool.
    #[must_use]
    pub fn with_http_client(config: OAuthConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Build the provider consent URL carrying `state` verbatim.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let mut params = vec![
            ("response_type".to_string(), "code".to_string()),
            (self.config.client_id_param().to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("scope".to_string(), self.config.scope_string()),
            ("state".to_string(), state.to_string()),
        ];

        params.extend(self.config.extra_authorize_params().iter().cloned());

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.config.authorization_endpoint.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query_string}", self.config.authorization_endpoint)
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    /// Returns error if the token endpoint rejects the code or the response
    /// cannot be parsed.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthClientError> {
        if code.trim().is_empty() {
            return Err(OAuthClientError::ConfigError("authorization code is empty".to_string()));
        }

        let params = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
        ];

        self.token_request(params).await
    }

    /// Obtain an application token with the client-credentials grant.
    ///
    /// # Errors
    /// Returns error if the provider refuses the client registration.
    pub async fn client_credentials(&self) -> Result<TokenSet, OAuthClientError> {
        let params = vec![("grant_type".to_string(), "client_credentials".to_string())];
        self.token_request(params).await
    }

    async fn token_request(
        &self,
        mut params: Vec<(String, String)>,
    ) -> Result<TokenSet, OAuthClientError> {
        params.push((self.config.client_id_param().to_string(), self.config.client_id.clone()));
        params.push(("client_secret".to_string(), self.config.client_secret.clone()));

        let response = self
            .client
            .post(&self.config.token_endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                endpoint = %self.config.token_endpoint,
                status = status.as_u16(),
                "token endpoint refused request"
            );
            return Err(match serde_json::from_str::<OAuthError>(&body) {
                Ok(error) => OAuthClientError::OAuthError(error),
                Err(_) => OAuthClientError::Status { status: status.as_u16(), body },
            });
        }

        // Some providers answer 200 with an error payload.
        if let Ok(error) = serde_json::from_str::<OAuthError>(&body) {
            if !body.contains("\"access_token\"") {
                return Err(OAuthClientError::OAuthError(error));
            }
        }

        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        Ok(token_response.into())
    }
}
