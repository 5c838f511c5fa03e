//! User record - a member's access grant, key history, and invite graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::invite::InviteRecord;
use crate::value_objects::{AccessTier, Snowflake};

/// A product key minted through the licensing panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedKey {
    pub value: String,
    pub days: i32,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedKey {
    pub fn new(value: impl Into<String>, days: i32, note: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            days,
            note: note.into(),
            created_at: now,
        }
    }
}

/// Persisted access record for a Discord account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub discord_id: Snowflake,
    pub username: String,
    pub access_tier: AccessTier,
    /// `None` never expires
    pub access_expires: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub generated_keys: Vec<GeneratedKey>,
    pub invites: Vec<InviteRecord>,
    pub total_invites: i32,
    pub invited_by: Option<Snowflake>,
    pub last_key_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create an active record for a fresh grant
    pub fn granted(
        discord_id: Snowflake,
        username: impl Into<String>,
        tier: AccessTier,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            discord_id,
            username: username.into(),
            access_tier: tier,
            access_expires: tier.expiry_from(now),
            is_active: true,
            generated_keys: Vec::new(),
            invites: Vec::new(),
            total_invites: 0,
            invited_by: None,
            last_key_generated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a record that only tracks the invite graph and grants nothing
    pub fn tracking_only(discord_id: Snowflake, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            is_active: false,
            access_expires: None,
            ..Self::granted(discord_id, username, AccessTier::OneDay, now)
        }
    }

    /// Apply a (re)grant: new tier, new expiry, reactivated
    pub fn apply_grant(&mut self, username: impl Into<String>, tier: AccessTier, now: DateTime<Utc>) {
        self.username = username.into();
        self.access_tier = tier;
        self.access_expires = tier.expiry_from(now);
        self.is_active = true;
        self.updated_at = now;
    }

    /// Whether the grant has a set expiry that lies in the past
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_expires.is_some_and(|expires| expires < now)
    }

    /// Keys sorted newest first
    pub fn keys_newest_first(&self) -> Vec<&GeneratedKey> {
        let mut keys: Vec<&GeneratedKey> = self.generated_keys.iter().collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        keys
    }

    /// Whether an invite code is already tracked on this record
    pub fn has_invite(&self, code: &str) -> bool {
        self.invites.iter().any(|invite| invite.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_granted_record() {
        let now = Utc::now();
        let record = UserRecord::granted(Snowflake::new(1), "alice", AccessTier::OneWeek, now);
        assert!(record.is_active);
        assert_eq!(record.access_expires, Some(now + Duration::days(7)));
        assert!(!record.is_expired_at(now + Duration::days(6)));
        assert!(record.is_expired_at(now + Duration::days(8)));
    }

    #[test]
    fn test_lifetime_never_expires() {
        let now = Utc::now();
        let record = UserRecord::granted(Snowflake::new(1), "alice", AccessTier::Lifetime, now);
        assert!(!record.is_expired_at(now + Duration::days(10_000)));
    }

    #[test]
    fn test_tracking_only_is_inactive() {
        let record = UserRecord::tracking_only(Snowflake::new(2), "bob", Utc::now());
        assert!(!record.is_active);
        assert!(record.access_expires.is_none());
    }

    #[test]
    fn test_apply_grant_reactivates() {
        let now = Utc::now();
        let mut record = UserRecord::tracking_only(Snowflake::new(2), "bob", now);
        record.apply_grant("bobby", AccessTier::OneMonth, now);
        assert!(record.is_active);
        assert_eq!(record.username, "bobby");
        assert_eq!(record.access_expires, Some(now + Duration::days(30)));
    }

    #[test]
    fn test_keys_newest_first() {
        let now = Utc::now();
        let mut record = UserRecord::granted(Snowflake::new(1), "alice", AccessTier::Lifetime, now);
        record.generated_keys.push(GeneratedKey::new("OLD", 1, "", now - Duration::days(2)));
        record.generated_keys.push(GeneratedKey::new("NEW", 1, "", now));
        let keys = record.keys_newest_first();
        assert_eq!(keys[0].value, "NEW");
        assert_eq!(keys[1].value, "OLD");
    }
}
