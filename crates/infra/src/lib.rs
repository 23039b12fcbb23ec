//! # InfluLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (`.env`, TOML/JSON file, environment overrides)
//! - Influencer persistence (SQLite via r2d2, in-memory)
//! - HTTP client with retry
//! - Provider OAuth adapters and live statistics sources
//! - Tracing-backed link notifier
//!
//! ## Architecture
//! - Implements traits defined in `influlink-core`
//! - Contains all "impure" code (I/O, network, database)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod notifier;

// Re-export commonly used items
pub use database::{DbManager, InMemoryInfluencerRepository, SqliteInfluencerRepository};
pub use errors::InfraError;
pub use http::{FetchError, HttpClient, HttpClientBuilder};
pub use integrations::{build_provider_registry, build_stats_aggregator};
pub use notifier::TracingLinkNotifier;
