//! User record <-> model mapper

use lazy_core::entities::{GeneratedKey, InviteRecord, UserRecord};
use lazy_core::error::DomainError;
use lazy_core::value_objects::{AccessTier, Snowflake};

use crate::models::{GeneratedKeyModel, UserInviteModel, UserModel};

impl From<GeneratedKeyModel> for GeneratedKey {
    fn from(model: GeneratedKeyModel) -> Self {
        GeneratedKey {
            value: model.value,
            days: model.days,
            note: model.note,
            created_at: model.created_at,
        }
    }
}

impl From<UserInviteModel> for InviteRecord {
    fn from(model: UserInviteModel) -> Self {
        InviteRecord {
            code: model.code,
            used_by: model.used_by.map(Snowflake::new),
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

impl UserModel {
    /// Assemble the full record from the row and its child rows
    pub fn into_record(
        self,
        keys: Vec<GeneratedKeyModel>,
        invites: Vec<UserInviteModel>,
    ) -> Result<UserRecord, DomainError> {
        let access_tier = self
            .access_tier
            .parse::<AccessTier>()
            .map_err(DomainError::DatabaseError)?;

        Ok(UserRecord {
            discord_id: Snowflake::new(self.discord_id),
            username: self.username,
            access_tier,
            access_expires: self.access_expires,
            is_active: self.is_active,
            generated_keys: keys.into_iter().map(GeneratedKey::from).collect(),
            invites: invites.into_iter().map(InviteRecord::from).collect(),
            total_invites: self.total_invites,
            invited_by: self.invited_by.map(Snowflake::new),
            last_key_generated_at: self.last_key_generated_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Scalar columns written by an upsert
pub struct UserUpsert<'a> {
    pub discord_id: i64,
    pub username: &'a str,
    pub access_tier: &'static str,
    pub access_expires: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
    pub invited_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> UserUpsert<'a> {
    pub fn new(record: &'a UserRecord) -> Self {
        Self {
            discord_id: record.discord_id.into_inner(),
            username: &record.username,
            access_tier: record.access_tier.as_str(),
            access_expires: record.access_expires,
            is_active: record.is_active,
            invited_by: record.invited_by.map(Snowflake::into_inner),
            created_at: record.created_at,
        }
    }
}
