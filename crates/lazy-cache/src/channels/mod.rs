//! Channels currently being closed.

use dashmap::DashSet;
use lazy_core::Snowflake;

/// Registry of channels between close and delete
///
/// A channel can only be claimed once; the claim is released when the channel
/// is deleted (or the delete fails).
#[derive(Debug, Default)]
pub struct ClosingChannels {
    channels: DashSet<Snowflake>,
}

impl ClosingChannels {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a channel for closing; false if it is already closing
    pub fn try_claim(&self, channel_id: Snowflake) -> bool {
        self.channels.insert(channel_id)
    }

    pub fn release(&self, channel_id: Snowflake) {
        self.channels.remove(&channel_id);
    }

    pub fn is_closing(&self, channel_id: Snowflake) -> bool {
        self.channels.contains(&channel_id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
