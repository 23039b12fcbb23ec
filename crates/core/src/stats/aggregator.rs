//! Statistics aggregation - fan-out / settle-all / fan-in
//!
//! One fetch per provider with a public handle, each under its own timeout.
//! A failed, timed out, empty or missing source is replaced by the fallback
//! estimate and reported in `degraded`; aggregation itself never fails.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use influlink_domain::{Influencer, Provider, StatsFragment, StatsSnapshot, StatsSourceError};
use tracing::{debug, warn};

use super::fallback::FallbackEstimator;
use super::ports::{StatsSource, StatsTarget};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Clone)]
pub struct StatsAggregator {
    sources: BTreeMap<Provider, Arc<dyn StatsSource>>,
    estimator: Option<FallbackEstimator>,
    timeout: Duration,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
            estimator: Some(FallbackEstimator::new()),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Register the live source for its provider.
    pub fn with_source(mut self, source: Arc<dyn StatsSource>) -> Self {
        self.sources.insert(source.provider(), source);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable the estimator; failed providers are then omitted.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.estimator = enabled.then(FallbackEstimator::new);
        self
    }

    pub async fn aggregate(&self, influencer: &Influencer) -> StatsSnapshot {
        let fetches = influencer.public_handles().map(|(provider, identity)| {
            let target = StatsTarget::from_identity(provider, identity);
            let source = self.sources.get(&provider).cloned();
            async move {
                let result = self.fetch_one(source, &target).await;
                (target, result)
            }
        });

        let settled = join_all(fetches).await;

        let mut providers = BTreeMap::new();
        let mut degraded = BTreeMap::new();

        for (target, result) in settled {
            let provider = target.provider;
            let reason = match result {
                Ok(mut fragment) if fragment.followers > 0 => {
                    fragment.provider = provider;
                    providers.insert(provider, fragment);
                    continue;
                }
                Ok(_) => "empty",
                Err(err) => {
                    match &err {
                        StatsSourceError::NotConfigured(_) | StatsSourceError::NotFound(_) => {
                            debug!(influencer_id = %influencer.id, %provider, error = %err, "live statistics unavailable");
                        }
                        _ => warn!(influencer_id = %influencer.id, %provider, error = %err, "statistics source failed"),
                    }
                    err.label()
                }
            };

            degraded.insert(provider, reason.to_string());
            if let Some(estimator) = &self.estimator {
                providers.insert(provider, estimator.estimate(provider, target.seed_key()));
            }
        }

        StatsSnapshot {
            influencer_id: influencer.id.clone(),
            generated_at: Utc::now(),
            providers,
            degraded,
        }
    }

    async fn fetch_one(
        &self,
        source: Option<Arc<dyn StatsSource>>,
        target: &StatsTarget,
    ) -> Result<StatsFragment, StatsSourceError> {
        let Some(source) = source else {
            return Err(StatsSourceError::NotConfigured(format!(
                "no statistics source for {}",
                target.provider
            )));
        };

        match tokio::time::timeout(self.timeout, source.fetch(target)).await {
            Ok(result) => result,
            Err(_) => Err(StatsSourceError::Timeout(
                u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}
