//! PostgreSQL implementation of ApplicationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use lazy_core::entities::Application;
use lazy_core::traits::{ApplicationRepository, RepoResult};
use lazy_core::value_objects::Snowflake;

use crate::models::ApplicationModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ApplicationRepository
#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    /// Create a new PgApplicationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    #[instrument(skip(self, application), fields(user_id = %application.user_id, status = application.status.as_str()))]
    async fn create(&self, application: &Application) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO applications (id, user_id, status, reason, handled_by, handled_at, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(application.id)
        .bind(application.user_id.into_inner())
        .bind(application.status.as_str())
        .bind(&application.reason)
        .bind(application.handled_by.map(Snowflake::into_inner))
        .bind(application.handled_at)
        .bind(application.expires_at)
        .bind(application.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_active_denial(
        &self,
        user_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Application>> {
        let result = sqlx::query_as::<_, ApplicationModel>(
            r"
            SELECT id, user_id, status, reason, handled_by, handled_at, expires_at, created_at
            FROM applications
            WHERE user_id = $1 AND status = 'denied' AND expires_at > $2
            ORDER BY handled_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id.into_inner())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Application::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM applications
            WHERE expires_at IS NOT NULL AND expires_at <= $1
            ",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
