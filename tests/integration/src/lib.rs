//! Integration test utilities for the bot
//!
//! Scenario tests drive the services end to end over in-memory stores and
//! platform fakes. Repository tests against PostgreSQL live in `lazy-db`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
