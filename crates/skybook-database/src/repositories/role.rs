//! Role repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use skybook_core::error::{AppError, ErrorKind};
use skybook_core::result::AppResult;
use skybook_entity::user::RoleRecord;

/// Repository for the `roles` table.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a role by authority name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        sqlx::query_as::<_, RoleRecord>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    /// Create a role, or return the existing row with that name.
    pub async fn create(&self, name: &str) -> AppResult<RoleRecord> {
        sqlx::query_as::<_, RoleRecord>(
            "INSERT INTO roles (id, name) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create role", e))
    }
}
