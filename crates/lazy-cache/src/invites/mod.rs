//! Invite snapshot module.
//!
//! Remembers the last observed use count of every guild invite.

mod snapshot;

pub use snapshot::{InviteSnapshot, InviteSnapshotCache, UsedInvite};
