//! Live statistics sources
//!
//! One [`StatsSource`](influlink_core::StatsSource) per provider, each
//! optionally wrapped in a TTL cache, assembled into a `StatsAggregator`
//! from configuration.

pub mod cached;
pub mod profile_search;
pub mod tiktok;
pub mod twitch;
pub mod youtube;

use std::sync::Arc;
use std::time::Duration;

use influlink_core::{StatsAggregator, StatsSource};
use influlink_domain::{Config, StatsSourceError};
use reqwest::StatusCode;
use tracing::info;

pub use cached::CachedStatsSource;
pub use profile_search::ProfileSearchSource;
pub use tiktok::TiktokScrapeSource;
pub use twitch::TwitchStatsSource;
pub use youtube::YoutubeStatsSource;

use crate::http::{FetchError, HttpClient};

/// Map a failed fetch to the statistics error vocabulary.
pub(crate) fn source_error(source: &str, err: FetchError) -> StatsSourceError {
    match err {
        FetchError::Status { status: StatusCode::NOT_FOUND, .. } => {
            StatsSourceError::NotFound(format!("{source}: profile does not exist"))
        }
        FetchError::Status { status, .. } => StatsSourceError::Unavailable(format!("{source}: HTTP {status}")),
        FetchError::Transport(err) => StatsSourceError::Unavailable(format!("{source}: {err}")),
        FetchError::Decode(msg) => StatsSourceError::Parse(format!("{source}: {msg}")),
    }
}

/// Parse a count the APIs serialize as a decimal string.
pub(crate) fn parse_count(source: &str, field: &str, value: Option<&str>) -> Result<u64, StatsSourceError> {
    match value {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| StatsSourceError::Parse(format!("{source}: {field} is not a count: {raw}"))),
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Build the aggregator with every source the configuration enables.
///
/// YouTube, TikTok and (when a search index is configured) Instagram are
/// always registered; an unconfigured YouTube key still registers the
/// source so the degraded reason reads `not_configured`.
pub fn build_stats_aggregator(config: &Config, http: &HttpClient) -> StatsAggregator {
    let stats = &config.stats;
    let ttl = Duration::from_secs(stats.cache_ttl_secs);

    let mut sources: Vec<Arc<dyn StatsSource>> = vec![
        Arc::new(YoutubeStatsSource::new(
            http.clone(),
            stats.youtube_api_key.clone(),
            stats.youtube_api_base_url.clone(),
        )),
        Arc::new(TiktokScrapeSource::new(http.clone(), stats.tiktok_web_base_url.clone())),
    ];

    if let Some(search) = stats.profile_search.as_ref().filter(|s| !s.base_url.trim().is_empty()) {
        sources.push(Arc::new(ProfileSearchSource::new(http.clone(), search)));
    }

    if let Some(twitch) = config.providers.twitch.as_ref().filter(|c| c.is_complete()) {
        sources.push(Arc::new(TwitchStatsSource::new(
            http.clone(),
            twitch,
            stats.twitch_api_base_url.clone(),
            stats.twitch_token_endpoint.clone(),
        )));
    }

    let mut aggregator = StatsAggregator::new()
        .with_timeout(Duration::from_millis(stats.timeout_ms.max(1)))
        .with_fallback(stats.fallback_enabled);

    for source in sources {
        let provider = source.provider();
        let name = source.name();
        let source: Arc<dyn StatsSource> = if ttl.is_zero() {
            source
        } else {
            Arc::new(CachedStatsSource::new(source, ttl))
        };
        info!(%provider, source = name, cached = !ttl.is_zero(), "statistics source registered");
        aggregator = aggregator.with_source(source);
    }

    aggregator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_map_by_code() {
        let not_found = source_error("x", FetchError::Status { status: StatusCode::NOT_FOUND, body: String::new() });
        assert_eq!(not_found.label(), "not_found");

        let quota = source_error("x", FetchError::Status { status: StatusCode::FORBIDDEN, body: String::new() });
        assert_eq!(quota.label(), "unavailable");

        assert_eq!(source_error("x", FetchError::Decode("eof".into())).label(), "parse");
    }

    #[test]
    fn counts_parse_from_strings() {
        assert_eq!(parse_count("yt", "viewCount", Some("1200")).unwrap(), 1200);
        assert_eq!(parse_count("yt", "viewCount", None).unwrap(), 0);
        assert!(parse_count("yt", "viewCount", Some("lots")).is_err());
        assert_eq!(ratio(10, 4), Some(2.5));
        assert_eq!(ratio(10, 0), None);
    }
}
