//! Public statistics: live sources, fan-out aggregation and the
//! deterministic fallback estimate.

pub mod aggregator;
pub mod fallback;
pub mod ports;

pub use aggregator::StatsAggregator;
pub use fallback::FallbackEstimator;
pub use ports::{StatsSource, StatsTarget};
