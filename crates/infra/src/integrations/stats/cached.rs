//! TTL cache decorator for statistics sources
//!
//! Only successful live fragments are cached; every error goes straight
//! back to the aggregator so it can fall back, and the next request retries
//! the source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use influlink_core::{StatsSource, StatsTarget};
use influlink_domain::{Provider, StatsFragment, StatsSourceError};
use moka::future::Cache;
use tracing::trace;

pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

pub struct CachedStatsSource {
    inner: Arc<dyn StatsSource>,
    cache: Cache<StatsTarget, StatsFragment>,
}

impl CachedStatsSource {
    pub fn new(inner: Arc<dyn StatsSource>, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: Arc<dyn StatsSource>, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();
        Self { inner, cache }
    }
}

#[async_trait]
impl StatsSource for CachedStatsSource {
    fn provider(&self) -> Provider {
        self.inner.provider()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, target: &StatsTarget) -> Result<StatsFragment, StatsSourceError> {
        if let Some(fragment) = self.cache.get(target).await {
            trace!(provider = %target.provider, "statistics cache hit");
            return Ok(fragment);
        }

        let fragment = self.inner.fetch(target).await?;
        self.cache.insert(target.clone(), fragment.clone()).await;
        Ok(fragment)
    }
}
