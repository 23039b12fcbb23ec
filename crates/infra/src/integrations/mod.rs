//! External platform integrations
//!
//! - [`providers`]: OAuth adapters used by the linking flow
//! - [`stats`]: live statistics sources used by the aggregator

pub mod providers;
pub mod stats;

pub use providers::build_provider_registry;
pub use stats::build_stats_aggregator;
