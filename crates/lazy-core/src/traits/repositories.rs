//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Application, GeneratedKey, InviteRecord, UserRecord};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a record regardless of its active flag
    async fn find_by_discord_id(&self, discord_id: Snowflake) -> RepoResult<Option<UserRecord>>;

    /// Find a record only if it is flagged active
    async fn find_active(&self, discord_id: Snowflake) -> RepoResult<Option<UserRecord>>;

    /// Insert or update the scalar fields of a record (keys and invites untouched)
    async fn upsert(&self, record: &UserRecord) -> RepoResult<()>;

    /// Flip the active flag
    async fn set_active(&self, discord_id: Snowflake, active: bool) -> RepoResult<()>;

    /// Append a generated key and stamp `last_key_generated_at`
    async fn push_key(&self, discord_id: Snowflake, key: &GeneratedKey) -> RepoResult<()>;

    /// Append an invite record
    async fn add_invite(&self, discord_id: Snowflake, invite: &InviteRecord) -> RepoResult<()>;

    /// Mark an owned invite as consumed; returns false if the code is not tracked
    async fn mark_invite_used(
        &self,
        owner_id: Snowflake,
        code: &str,
        used_by: Snowflake,
    ) -> RepoResult<bool>;

    /// Increment the lifetime invite counter and return the new total
    async fn increment_total_invites(&self, discord_id: Snowflake) -> RepoResult<i32>;

    /// Record who invited this user
    async fn set_invited_by(&self, discord_id: Snowflake, inviter_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Application Repository
// ============================================================================

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Store a decision
    async fn create(&self, application: &Application) -> RepoResult<()>;

    /// Most recent denial (by decision time) that still blocks at `now`
    async fn latest_active_denial(
        &self,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Application>>;

    /// Remove denials whose block has lapsed; returns the number removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}
