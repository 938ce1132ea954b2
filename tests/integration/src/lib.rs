//! Integration test utilities for the IP ban service
//!
//! This crate drives the real axum router end to end, backed by in-memory
//! repositories so no database is needed.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
