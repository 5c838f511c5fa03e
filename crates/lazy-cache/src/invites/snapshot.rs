//! Per-guild invite use counts.

use std::collections::HashMap;

use dashmap::DashMap;
use lazy_core::{InviteUsage, Snowflake};

/// Use counts of every invite in a guild at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteSnapshot {
    uses: HashMap<String, u64>,
}

/// The invite a join was attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedInvite {
    pub code: String,
    pub inviter_id: Option<Snowflake>,
    /// Other codes whose count also increased in the same window
    pub competing: usize,
}

impl InviteSnapshot {
    pub fn from_usages(usages: &[InviteUsage]) -> Self {
        Self {
            uses: usages
                .iter()
                .map(|usage| (usage.code.clone(), usage.uses))
                .collect(),
        }
    }

    pub fn uses(&self, code: &str) -> Option<u64> {
        self.uses.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.uses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }

    /// Find the invite whose use count grew since this snapshot
    ///
    /// Codes unknown to the snapshot count from zero. When several codes grew,
    /// the largest increase wins and ties go to the lexically smallest code.
    pub fn find_used(&self, current: &[InviteUsage]) -> Option<UsedInvite> {
        let mut increased: Vec<(&InviteUsage, u64)> = current
            .iter()
            .filter_map(|usage| {
                let before = self.uses(&usage.code).unwrap_or(0);
                (usage.uses > before).then(|| (usage, usage.uses - before))
            })
            .collect();

        increased.sort_by(|(a, da), (b, db)| db.cmp(da).then_with(|| a.code.cmp(&b.code)));

        let competing = increased.len().saturating_sub(1);
        increased.first().map(|(usage, _)| UsedInvite {
            code: usage.code.clone(),
            inviter_id: usage.inviter_id,
            competing,
        })
    }
}

/// Concurrent map of guild id to its last snapshot
#[derive(Debug, Default)]
pub struct InviteSnapshotCache {
    guilds: DashMap<Snowflake, InviteSnapshot>,
}

impl InviteSnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild_id: Snowflake) -> Option<InviteSnapshot> {
        self.guilds.get(&guild_id).map(|snapshot| snapshot.clone())
    }

    /// Store a snapshot unconditionally and return the one it replaced
    pub fn replace(&self, guild_id: Snowflake, snapshot: InviteSnapshot) -> Option<InviteSnapshot> {
        let previous = self.guilds.insert(guild_id, snapshot);
        tracing::trace!(guild_id = %guild_id, seeded = previous.is_none(), "Invite snapshot stored");
        previous
    }

    pub fn contains(&self, guild_id: Snowflake) -> bool {
        self.guilds.contains_key(&guild_id)
    }
}
