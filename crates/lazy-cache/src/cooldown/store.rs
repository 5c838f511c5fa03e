//! Cooldown table keyed by command, scope and scope id.

use dashmap::DashMap;
use lazy_core::{CooldownScope, Snowflake};

/// Scope id used for global cooldowns
pub const GLOBAL_SCOPE_ID: Snowflake = Snowflake::new(0);

/// Key of one cooldown entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub command: String,
    pub scope: CooldownScope,
    pub scope_id: Snowflake,
}

impl CooldownKey {
    pub fn new(command: impl Into<String>, scope: CooldownScope, scope_id: Snowflake) -> Self {
        Self {
            command: command.into(),
            scope,
            scope_id,
        }
    }

    pub fn user(command: &str, user_id: Snowflake) -> Self {
        Self::new(command, CooldownScope::User, user_id)
    }

    pub fn guild(command: &str, guild_id: Snowflake) -> Self {
        Self::new(command, CooldownScope::Guild, guild_id)
    }

    pub fn global(command: &str) -> Self {
        Self::new(command, CooldownScope::Global, GLOBAL_SCOPE_ID)
    }
}

/// Concurrent cooldown table
///
/// Values are unix seconds. Entries are overwritten, never removed, except by
/// [`CooldownStore::purge_expired`].
#[derive(Debug, Default)]
pub struct CooldownStore {
    entries: DashMap<CooldownKey, i64>,
}

impl CooldownStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored expiry for a key
    pub fn expiry(&self, key: &CooldownKey) -> Option<i64> {
        self.entries.get(key).map(|entry| *entry)
    }

    /// Store (or overwrite) the expiry for a key
    pub fn set_expiry(&self, key: CooldownKey, expires_at: i64) {
        self.entries.insert(key, expires_at);
    }

    /// Drop every entry whose expiry is not after `now`; returns the number removed
    pub fn purge_expired(&self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            tracing::debug!(removed, "Purged expired cooldowns");
        }

        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
