//! Cooldown storage module.
//!
//! Stores the absolute expiry of each command cooldown.

mod store;

pub use store::{CooldownKey, CooldownStore, GLOBAL_SCOPE_ID};
