//! Refresh token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use skybook_core::error::{AppError, ErrorKind};
use skybook_core::result::AppResult;
use skybook_entity::token::{NewRefreshToken, RefreshTokenRecord};

use super::map_insert_error;

/// Repository for the `refresh_tokens` table.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new record.
    pub async fn create(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "INSERT INTO refresh_tokens \
               (id, user_id, token_hash, device_id, user_agent, ip_address, created_at, expires_at, \
                session_epoch) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.user_id)
        .bind(&data.token_hash)
        .bind(&data.device_id)
        .bind(&data.user_agent)
        .bind(&data.ip_address)
        .bind(data.created_at)
        .bind(data.expires_at)
        .bind(data.session_epoch)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Refresh token hash collision", "Failed to store refresh token"))
    }

    /// Find a record by token hash.
    pub async fn find_by_hash(&self, hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
        })
    }

    /// Find a record by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>("SELECT * FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    /// Consume an active record. Only one concurrent caller gets a row back.
    pub async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let won: Option<Uuid> = sqlx::query_scalar(
            "UPDATE refresh_tokens SET revoked_at = $2, last_used_at = $2 \
             WHERE id = $1 AND revoked_at IS NULL AND expires_at > $2 \
             RETURNING id",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume refresh token", e)
        })?;
        Ok(won.is_some())
    }

    /// Revoke if not yet revoked.
    pub async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let revoked: Option<Uuid> = sqlx::query_scalar(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE id = $1 AND revoked_at IS NULL RETURNING id",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
        })?;
        Ok(revoked.is_some())
    }

    /// All of a user's records, optionally for one device.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        device_id: Option<&str>,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens \
             WHERE user_id = $1 AND ($2::text IS NULL OR device_id = $2) \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list refresh tokens", e)
        })
    }

    /// Active records, newest first.
    pub async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens \
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active sessions", e)
        })
    }
}
