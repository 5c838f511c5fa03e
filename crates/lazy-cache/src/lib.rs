//! # lazy-cache
//!
//! Process-local soft state shared by the services.
//!
//! ## Features
//!
//! - **Cooldowns**: absolute expiry per (command, scope, scope id)
//! - **Invite snapshots**: last observed use count of each guild invite
//! - **Closing channels**: channels between close and delete
//!
//! Everything here lives as long as the process and is lost on restart.

pub mod channels;
pub mod cooldown;
pub mod invites;

pub use channels::ClosingChannels;
pub use cooldown::{CooldownKey, CooldownStore, GLOBAL_SCOPE_ID};
pub use invites::{InviteSnapshot, InviteSnapshotCache, UsedInvite};
