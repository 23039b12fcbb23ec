//! OAuth 2.0 authorization-code flow for confidential server clients
//!
//! The redirect round trip is server-issued: the service builds the
//! authorization URL with an opaque `state`, the provider calls back with
//! `(code, state)`, and the code is exchanged with the client secret.
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenSet`, `TokenResponse`, `OAuthConfig`, `OAuthError`
//! - **[`client`]**: authorization URL building, code exchange, refresh
//!
//! # Provider quirks handled here
//!
//! - TikTok names the client identifier `client_key`
//!   ([`OAuthConfig::with_client_id_param`])
//! - Twitch returns `scope` as an array; Facebook omits `token_type`
//!   ([`TokenResponse`] accepts both)

pub mod client;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};
