//! Shared test helpers for `influlink-core` integration tests.
//!
//! Lightweight in-memory mocks for every core port so the flow tests can
//! focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod adapters;
pub mod repositories;
pub mod sources;
