//! # lazy-bot
//!
//! Discord front end of the community bot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ handlers (serenity events, validator gate)   │
//! ├──────────────────────────────────────────────┤
//! │ lazy-service (access, keys, tickets, ...)    │
//! ├──────────────┬──────────────┬────────────────┤
//! │ gateway      │ lazy-panel   │ lazy-db        │
//! │ (serenity)   │ (browser)    │ (PostgreSQL)   │
//! └──────────────┴──────────────┴────────────────┘
//! ```

pub mod commands;
pub mod gateway;
pub mod handlers;
pub mod health;
pub mod janitor;
pub mod options;
pub mod render;
pub mod server;
pub mod state;

pub use server::run;
