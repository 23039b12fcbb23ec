//! # InfluLink API
//!
//! HTTP application layer - routes and main entry point.
//!
//! This crate contains:
//! - axum routes for the redirect flow and influencer reads
//! - Application context (dependency injection)
//! - Error mapping and caller authorization
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod access;
pub mod context;
pub mod error;
pub mod routes;
pub mod utils;

pub use access::Caller;
pub use context::AppContext;
pub use error::ApiError;
pub use routes::build_router;
