//! Invite tracking - per-inviter invite records and reward thresholds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// An invite code owned by a tracked user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRecord {
    pub code: String,
    pub used_by: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InviteRecord {
    pub fn new(code: impl Into<String>, created_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            code: code.into(),
            used_by: None,
            created_at,
            expires_at,
        }
    }

    /// Get the full invite URL
    pub fn url(&self) -> String {
        format!("https://discord.gg/{}", self.code)
    }
}

/// Live usage of a guild invite as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteUsage {
    pub code: String,
    pub inviter_id: Option<Snowflake>,
    pub uses: u64,
}

/// Key issued to an inviter at an exact invite count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteReward {
    pub invites: i32,
    pub days: i32,
    pub note: &'static str,
}

/// Reward table, matched by equality on the inviter's total
pub const INVITE_REWARDS: [InviteReward; 3] = [
    InviteReward {
        invites: 3,
        days: 1,
        note: "Reward for 3 invites",
    },
    InviteReward {
        invites: 5,
        days: 7,
        note: "Reward for 5 invites",
    },
    InviteReward {
        invites: 10,
        days: 30,
        note: "Reward for 10 invites",
    },
];

impl InviteReward {
    /// Reward owed when the inviter's total becomes exactly `total_invites`
    pub fn for_total(total_invites: i32) -> Option<&'static InviteReward> {
        INVITE_REWARDS.iter().find(|reward| reward.invites == total_invites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_exact_thresholds() {
        assert_eq!(InviteReward::for_total(3).map(|r| r.days), Some(1));
        assert_eq!(InviteReward::for_total(5).map(|r| r.days), Some(7));
        assert_eq!(InviteReward::for_total(10).map(|r| r.days), Some(30));
    }

    #[test]
    fn test_reward_not_a_range() {
        for total in [0, 1, 2, 4, 6, 9, 11, 20] {
            assert!(InviteReward::for_total(total).is_none(), "unexpected reward at {total}");
        }
    }

    #[test]
    fn test_invite_url() {
        let invite = InviteRecord::new("abc123", Utc::now(), None);
        assert_eq!(invite.url(), "https://discord.gg/abc123");
        assert!(invite.used_by.is_none());
    }
}
