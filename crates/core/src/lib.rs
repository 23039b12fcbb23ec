//! # InfluLink Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for provider adapters, persistence,
//!   notifications and statistics sources
//! - The identity linking flow (state tokens, registry, merge, service)
//! - Statistics aggregation and the fallback estimator
//!
//! ## Architecture Principles
//! - Only depends on `influlink-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod link;
pub mod stats;

pub use link::ports::{InfluencerRepository, LinkNotifier, ProviderAdapter};
pub use link::registry::ProviderRegistry;
pub use link::resolver::{merge_identity, LinkOutcome, LinkResolver};
pub use link::service::{CallbackParams, LinkService};
pub use link::state_token::StateTokenCodec;
pub use stats::aggregator::StatsAggregator;
pub use stats::fallback::FallbackEstimator;
pub use stats::ports::{StatsSource, StatsTarget};
