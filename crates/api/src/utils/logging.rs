//! Tracing subscriber setup and error labels for structured logs

use influlink_domain::{InfluLinkError, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter; JSON output is opt-in.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };

    if let Err(err) = installed {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}

/// Stable label for an error, suitable for log fields.
#[inline]
pub fn error_label(error: &InfluLinkError) -> &'static str {
    match error {
        InfluLinkError::Database(_) => "database",
        InfluLinkError::Config(_) => "config",
        InfluLinkError::Network(_) => "network",
        InfluLinkError::Auth(_) => "auth",
        InfluLinkError::Security(_) => "security",
        InfluLinkError::Decode(_) => "decode",
        InfluLinkError::ProfileFetch(_) => "profile_fetch",
        InfluLinkError::EntityNotFound(_) => "entity_not_found",
        InfluLinkError::ProviderNotConfigured(_) => "provider_not_configured",
        InfluLinkError::MergeConflict(_) => "merge_conflict",
        InfluLinkError::Conflict(_) => "conflict",
        InfluLinkError::NotFound(_) => "not_found",
        InfluLinkError::InvalidInput(_) => "invalid_input",
        InfluLinkError::Internal(_) => "internal",
    }
}
