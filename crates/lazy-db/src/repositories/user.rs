//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lazy_core::entities::{GeneratedKey, InviteRecord, UserRecord};
use lazy_core::traits::{RepoResult, UserRepository};
use lazy_core::value_objects::Snowflake;

use crate::mappers::UserUpsert;
use crate::models::{GeneratedKeyModel, UserInviteModel, UserModel};

use super::error::{map_db_error, map_invite_insert, user_not_found};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load child rows and assemble the record
    async fn hydrate(&self, model: UserModel) -> RepoResult<UserRecord> {
        let keys = sqlx::query_as::<_, GeneratedKeyModel>(
            r"
            SELECT id, user_id, value, days, note, created_at
            FROM generated_keys
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(model.discord_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let invites = sqlx::query_as::<_, UserInviteModel>(
            r"
            SELECT id, user_id, code, used_by, created_at, expires_at
            FROM user_invites
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(model.discord_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.into_record(keys, invites)
    }

    async fn find_where(&self, discord_id: Snowflake, active_only: bool) -> RepoResult<Option<UserRecord>> {
        let model = sqlx::query_as::<_, UserModel>(
            r"
            SELECT discord_id, username, access_tier, access_expires, is_active, total_invites,
                   invited_by, last_key_generated_at, created_at, updated_at
            FROM users
            WHERE discord_id = $1 AND (is_active OR NOT $2)
            ",
        )
        .bind(discord_id.into_inner())
        .bind(active_only)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match model {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_discord_id(&self, discord_id: Snowflake) -> RepoResult<Option<UserRecord>> {
        self.find_where(discord_id, false).await
    }

    #[instrument(skip(self))]
    async fn find_active(&self, discord_id: Snowflake) -> RepoResult<Option<UserRecord>> {
        self.find_where(discord_id, true).await
    }

    #[instrument(skip(self, record), fields(discord_id = %record.discord_id))]
    async fn upsert(&self, record: &UserRecord) -> RepoResult<()> {
        let row = UserUpsert::new(record);

        sqlx::query(
            r"
            INSERT INTO users (discord_id, username, access_tier, access_expires, is_active,
                               invited_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (discord_id) DO UPDATE
            SET username = EXCLUDED.username,
                access_tier = EXCLUDED.access_tier,
                access_expires = EXCLUDED.access_expires,
                is_active = EXCLUDED.is_active,
                invited_by = COALESCE(users.invited_by, EXCLUDED.invited_by),
                updated_at = NOW()
            ",
        )
        .bind(row.discord_id)
        .bind(row.username)
        .bind(row.access_tier)
        .bind(row.access_expires)
        .bind(row.is_active)
        .bind(row.invited_by)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_active(&self, discord_id: Snowflake, active: bool) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE discord_id = $1
            ",
        )
        .bind(discord_id.into_inner())
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(discord_id));
        }

        Ok(())
    }

    #[instrument(skip(self, key))]
    async fn push_key(&self, discord_id: Snowflake, key: &GeneratedKey) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE users
            SET last_key_generated_at = $2, updated_at = NOW()
            WHERE discord_id = $1
            ",
        )
        .bind(discord_id.into_inner())
        .bind(key.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(discord_id));
        }

        sqlx::query(
            r"
            INSERT INTO generated_keys (user_id, value, days, note, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(discord_id.into_inner())
        .bind(&key.value)
        .bind(key.days)
        .bind(&key.note)
        .bind(key.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, invite), fields(code = %invite.code))]
    async fn add_invite(&self, discord_id: Snowflake, invite: &InviteRecord) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_invites (user_id, code, used_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(discord_id.into_inner())
        .bind(&invite.code)
        .bind(invite.used_by.map(Snowflake::into_inner))
        .bind(invite.created_at)
        .bind(invite.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_invite_insert(e, &invite.code))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_invite_used(
        &self,
        owner_id: Snowflake,
        code: &str,
        used_by: Snowflake,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE user_invites
            SET used_by = $3
            WHERE user_id = $1 AND code = $2
            ",
        )
        .bind(owner_id.into_inner())
        .bind(code)
        .bind(used_by.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn increment_total_invites(&self, discord_id: Snowflake) -> RepoResult<i32> {
        let total = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE users
            SET total_invites = total_invites + 1, updated_at = NOW()
            WHERE discord_id = $1
            RETURNING total_invites
            ",
        )
        .bind(discord_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        total.ok_or_else(|| user_not_found(discord_id))
    }

    #[instrument(skip(self))]
    async fn set_invited_by(&self, discord_id: Snowflake, inviter_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET invited_by = $2, updated_at = NOW()
            WHERE discord_id = $1
            ",
        )
        .bind(discord_id.into_inner())
        .bind(inviter_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(discord_id));
        }

        Ok(())
    }
}
