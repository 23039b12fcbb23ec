//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for InfluLink
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum InfluLinkError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Authorization grant exchange failed or the provider refused consent.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Security error: {0}")]
    Security(String),

    /// Correlation state carried through the redirect could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Secondary profile lookup failed after a successful exchange.
    #[error("Profile fetch error: {0}")]
    ProfileFetch(String),

    #[error("Influencer not found: {0}")]
    EntityNotFound(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// The stored document moved underneath a read-modify-write.
    #[error("Merge conflict: {0}")]
    MergeConflict(String),

    /// The request contradicts the stored state (duplicate id, verified
    /// binding).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InfluLinkError {
    /// Canonical error for a missing, truncated or tampered state token.
    pub fn corrupt_state() -> Self {
        Self::Decode("missing or corrupt correlation state".to_string())
    }
}

/// Result type alias for InfluLink operations
pub type Result<T> = std::result::Result<T, InfluLinkError>;

/// Failure of a single statistics source.
///
/// Never fatal to a snapshot: every variant routes the affected provider to
/// the fallback estimator.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StatsSourceError {
    #[error("statistics source not configured: {0}")]
    NotConfigured(String),

    #[error("statistics source unavailable: {0}")]
    Unavailable(String),

    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("statistics source timed out after {0} ms")]
    Timeout(u64),

    #[error("unparsable statistics payload: {0}")]
    Parse(String),
}

impl StatsSourceError {
    /// Stable label for logs and degraded-provider reasons.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::Unavailable(_) => "unavailable",
            Self::NotFound(_) => "not_found",
            Self::Timeout(_) => "timeout",
            Self::Parse(_) => "parse",
        }
    }
}
