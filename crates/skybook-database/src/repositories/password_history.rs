//! Password history repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use skybook_core::error::{AppError, ErrorKind};
use skybook_core::result::AppResult;

/// Repository for the append-only `password_history` table.
#[derive(Debug, Clone)]
pub struct PasswordHistoryRepository {
    pool: PgPool,
}

impl PasswordHistoryRepository {
    /// Create a new password history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn append(
        &self,
        user_id: Uuid,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO password_history (id, user_id, password_hash, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append password history", e)
        })?;
        Ok(())
    }

    /// The most recent hashes, newest first.
    pub async fn recent_hashes(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM password_history WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load password history", e)
        })
    }
}
