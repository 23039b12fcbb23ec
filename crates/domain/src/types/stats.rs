//! Statistics fragments and aggregated snapshots

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::Provider;

/// Where a fragment's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsOrigin {
    /// Reported by a live source.
    Live,
    /// Synthesized by the fallback estimator. Not authoritative.
    Fallback,
}

/// One bucket of an audience breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceShare {
    pub label: String,
    pub percentage: f64,
}

impl AudienceShare {
    pub fn new(label: impl Into<String>, percentage: f64) -> Self {
        Self { label: label.into(), percentage }
    }
}

/// Public statistics for one provider account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsFragment {
    pub provider: Provider,
    pub followers: u64,
    pub engagement_rate: Option<f64>,
    pub avg_likes: Option<f64>,
    pub avg_comments: Option<f64>,
    pub avg_views: Option<f64>,
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub audience_gender: Vec<AudienceShare>,
    #[serde(default)]
    pub audience_age: Vec<AudienceShare>,
    #[serde(default)]
    pub audience_country: Vec<AudienceShare>,
    pub source: StatsOrigin,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StatsFragment {
    /// Live fragment with only a follower count, stamped now.
    pub fn live(provider: Provider, followers: u64) -> Self {
        Self {
            provider,
            followers,
            engagement_rate: None,
            avg_likes: None,
            avg_comments: None,
            avg_views: None,
            quality_score: None,
            audience_gender: Vec::new(),
            audience_age: Vec::new(),
            audience_country: Vec::new(),
            source: StatsOrigin::Live,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == StatsOrigin::Fallback
    }
}

/// Score in `[0, 100]` from audience size and engagement.
///
/// Reach contributes up to 60 points on a log scale saturating at 10M
/// followers; engagement contributes up to 40 points saturating at 8%.
pub fn quality_score(followers: u64, engagement_rate: Option<f64>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let reach = ((followers.max(1) as f64).log10() / 7.0).clamp(0.0, 1.0) * 60.0;
    let engagement = engagement_rate.map_or(0.0, |rate| (rate / 8.0).clamp(0.0, 1.0) * 40.0);
    ((reach + engagement) * 10.0).round() / 10.0
}

/// Per-request statistics across every provider with a public handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub influencer_id: String,
    pub generated_at: DateTime<Utc>,
    pub providers: BTreeMap<Provider, StatsFragment>,
    /// Providers whose live source failed, with the failure label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub degraded: BTreeMap<Provider, String>,
}

impl StatsSnapshot {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
