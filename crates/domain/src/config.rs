//! Application configuration structures
//!
//! Loading lives in `influlink-infra::config`; these are plain data.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub providers: ProvidersConfig,
    pub stats: StatsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener and public URL used to build redirect URIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL, e.g. `https://api.example.com`.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Document store settings. No path selects the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: None, pool_size: 8 }
    }
}

/// Secrets guarding the redirect flow and the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Key material for state tokens. Random per process when unset.
    pub state_secret: Option<String>,
    /// Bearer token for privileged callers. Unset authorizes everyone.
    pub admin_token: Option<String>,
}

/// OAuth client registration for one provider.
///
/// Endpoint overrides exist for tests and self-hosted proxies; unset
/// endpoints use the provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub api_base_url: Option<String>,
    pub scopes: Option<Vec<String>>,
}

impl OAuthClientConfig {
    /// Both halves of the client registration are present.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Per-provider OAuth registrations. Absent entries disable the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub youtube: Option<OAuthClientConfig>,
    pub facebook: Option<OAuthClientConfig>,
    pub twitch: Option<OAuthClientConfig>,
    pub tiktok: Option<OAuthClientConfig>,
}

/// Third-party profile search index used for Instagram statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSearchConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Statistics aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Per-provider fetch timeout.
    pub timeout_ms: u64,
    /// Live fragment cache lifetime; zero disables caching.
    pub cache_ttl_secs: u64,
    pub fallback_enabled: bool,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base_url: Option<String>,
    pub profile_search: Option<ProfileSearchConfig>,
    pub twitch_api_base_url: Option<String>,
    pub twitch_token_endpoint: Option<String>,
    pub tiktok_web_base_url: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 4_000,
            cache_ttl_secs: 300,
            fallback_enabled: true,
            youtube_api_key: None,
            youtube_api_base_url: None,
            profile_search: None,
            twitch_api_base_url: None,
            twitch_token_endpoint: None,
            tiktok_web_base_url: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info,influlink=debug".to_string(), json: false }
    }
}
