//! # InfluLink Domain
//!
//! Business domain types and models for InfluLink.
//!
//! This crate contains:
//! - Influencer entity and per-provider social identity bindings
//! - Provider profile fragments and statistics fragments
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other InfluLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
