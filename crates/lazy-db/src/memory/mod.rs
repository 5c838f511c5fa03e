//! In-memory repositories
//!
//! Same contracts as the PostgreSQL store, held in process memory. Used when
//! the bot runs without a database and by the service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use lazy_core::entities::{Application, ApplicationStatus, GeneratedKey, InviteRecord, UserRecord};
use lazy_core::error::DomainError;
use lazy_core::traits::{ApplicationRepository, RepoResult, UserRepository};
use lazy_core::value_objects::Snowflake;

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Snowflake, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn with_record<T>(
        &self,
        discord_id: Snowflake,
        f: impl FnOnce(&mut UserRecord) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut users = self.users.write();
        let record = users
            .get_mut(&discord_id)
            .ok_or(DomainError::UserNotFound(discord_id))?;
        f(record)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_discord_id(&self, discord_id: Snowflake) -> RepoResult<Option<UserRecord>> {
        Ok(self.users.read().get(&discord_id).cloned())
    }

    async fn find_active(&self, discord_id: Snowflake) -> RepoResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .get(&discord_id)
            .filter(|record| record.is_active)
            .cloned())
    }

    async fn upsert(&self, record: &UserRecord) -> RepoResult<()> {
        let mut users = self.users.write();
        match users.get_mut(&record.discord_id) {
            Some(existing) => {
                existing.username.clone_from(&record.username);
                existing.access_tier = record.access_tier;
                existing.access_expires = record.access_expires;
                existing.is_active = record.is_active;
                if existing.invited_by.is_none() {
                    existing.invited_by = record.invited_by;
                }
                existing.updated_at = Utc::now();
            }
            None => {
                let mut fresh = record.clone();
                fresh.generated_keys.clear();
                fresh.invites.clear();
                fresh.total_invites = 0;
                fresh.last_key_generated_at = None;
                users.insert(record.discord_id, fresh);
            }
        }
        Ok(())
    }

    async fn set_active(&self, discord_id: Snowflake, active: bool) -> RepoResult<()> {
        self.with_record(discord_id, |record| {
            record.is_active = active;
            record.updated_at = Utc::now();
            Ok(())
        })
    }

    async fn push_key(&self, discord_id: Snowflake, key: &GeneratedKey) -> RepoResult<()> {
        self.with_record(discord_id, |record| {
            record.generated_keys.push(key.clone());
            record.last_key_generated_at = Some(key.created_at);
            Ok(())
        })
    }

    async fn add_invite(&self, discord_id: Snowflake, invite: &InviteRecord) -> RepoResult<()> {
        self.with_record(discord_id, |record| {
            if record.has_invite(&invite.code) {
                return Err(DomainError::InviteCodeExists(invite.code.clone()));
            }
            record.invites.push(invite.clone());
            Ok(())
        })
    }

    async fn mark_invite_used(
        &self,
        owner_id: Snowflake,
        code: &str,
        used_by: Snowflake,
    ) -> RepoResult<bool> {
        let mut users = self.users.write();
        let Some(invite) = users
            .get_mut(&owner_id)
            .and_then(|record| record.invites.iter_mut().find(|invite| invite.code == code))
        else {
            return Ok(false);
        };
        invite.used_by = Some(used_by);
        Ok(true)
    }

    async fn increment_total_invites(&self, discord_id: Snowflake) -> RepoResult<i32> {
        self.with_record(discord_id, |record| {
            record.total_invites += 1;
            Ok(record.total_invites)
        })
    }

    async fn set_invited_by(&self, discord_id: Snowflake, inviter_id: Snowflake) -> RepoResult<()> {
        self.with_record(discord_id, |record| {
            record.invited_by = Some(inviter_id);
            Ok(())
        })
    }
}

/// In-memory implementation of ApplicationRepository
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    applications: RwLock<Vec<Application>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.applications.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.read().is_empty()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, application: &Application) -> RepoResult<()> {
        self.applications.write().push(application.clone());
        Ok(())
    }

    async fn latest_active_denial(
        &self,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Application>> {
        Ok(self
            .applications
            .read()
            .iter()
            .filter(|app| app.user_id == user_id && app.status == ApplicationStatus::Denied)
            .filter(|app| app.expires_at.is_some_and(|expires| expires > now))
            .max_by_key(|app| app.handled_at)
            .cloned())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut applications = self.applications.write();
        let before = applications.len();
        applications.retain(|app| !app.expires_at.is_some_and(|expires| expires <= now));
        Ok((before - applications.len()) as u64)
    }
}
