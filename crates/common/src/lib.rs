//! Shared utilities for InfluLink crates.
//!
//! Currently hosts the OAuth 2.0 authorization-code plumbing shared by every
//! provider adapter.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

pub use auth::{OAuthClient, OAuthClientError, OAuthConfig, OAuthError, TokenResponse, TokenSet};
