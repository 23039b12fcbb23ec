//! OAuth 2.0 types and structures
//!
//! Token sets, raw token responses, client configuration and the standard
//! error payload, shared by every provider adapter.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// OAuth 2.0 access and refresh tokens with metadata
///
/// - Optional refresh token (some providers don't issue them)
/// - Both expires_in (duration) and expires_at (timestamp) for flexibility
/// - Scope tracking for granted permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API calls on behalf of the account
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type ("Bearer" unless the provider says otherwise)
    pub token_type: String,

    /// Access token lifetime in seconds (0 when the provider did not say)
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Provider-specific account id returned with the token (TikTok `open_id`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        scope: Option<String>,
    ) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            scope,
            subject: None,
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let threshold = chrono::Duration::seconds(threshold_seconds);
                Utc::now() + threshold >= expires_at
            }
            None => false,
        }
    }
}

/// OAuth token response from authorization server
///
/// Tolerant of the shapes providers actually return: `token_type` and
/// `expires_in` may be missing, `scope` may be a string or an array.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_scope")]
    pub scope: Option<String>,
    #[serde(default)]
    pub open_id: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.expires_in.unwrap_or_default(),
            response.scope,
        );
        if let Some(token_type) = response.token_type {
            tokens.token_type = token_type;
        }
        tokens.subject = response.open_id;
        tokens
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeField {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_scope<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<ScopeField>::deserialize(deserializer)?;
    Ok(field.map(|scope| match scope {
        ScopeField::Joined(value) => value,
        ScopeField::List(values) => values.join(" "),
    }))
}

/// OAuth client registration and provider endpoints
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Provider consent screen
    pub authorization_endpoint: String,

    /// Code/refresh exchange endpoint
    pub token_endpoint: String,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret (server-side confidential client)
    pub client_secret: String,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// OAuth scopes to request
    pub scopes: Vec<String>,

    scope_separator: String,
    client_id_param: String,
    extra_authorize_params: Vec<(String, String)>,
}

impl OAuthConfig {
    /// Create a new OAuth configuration
    #[must_use]
    pub fn new(
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes,
            scope_separator: " ".to_string(),
            client_id_param: "client_id".to_string(),
            extra_authorize_params: Vec::new(),
        }
    }

    /// Use a different separator when joining scopes (TikTok uses `,`).
    #[must_use]
    pub fn with_scope_separator(mut self, separator: impl Into<String>) -> Self {
        self.scope_separator = separator.into();
        self
    }

    /// Use a different parameter name for the client id (TikTok uses
    /// `client_key`).
    #[must_use]
    pub fn with_client_id_param(mut self, name: impl Into<String>) -> Self {
        self.client_id_param = name.into();
        self
    }

    /// Append a static parameter to every authorization URL.
    #[must_use]
    pub fn with_authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_authorize_params.push((key.into(), value.into()));
        self
    }

    /// Get scopes joined with the provider's separator
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(&self.scope_separator)
    }

    /// Name of the client id parameter.
    #[must_use]
    pub fn client_id_param(&self) -> &str {
        &self.client_id_param
    }

    /// Extra authorization URL parameters.
    #[must_use]
    pub fn extra_authorize_params(&self) -> &[(String, String)] {
        &self.extra_authorize_params
    }
}

/// OAuth error response from authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
