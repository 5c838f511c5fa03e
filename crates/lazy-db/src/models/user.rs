//! User database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub discord_id: i64,
    pub username: String,
    pub access_tier: String,
    pub access_expires: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub total_invites: i32,
    pub invited_by: Option<i64>,
    pub last_key_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for generated_keys table
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedKeyModel {
    pub id: i64,
    pub user_id: i64,
    pub value: String,
    pub days: i32,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for user_invites table
#[derive(Debug, Clone, FromRow)]
pub struct UserInviteModel {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
    pub used_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
