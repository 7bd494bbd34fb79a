//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use skybook_core::error::{AppError, ErrorKind};
use skybook_core::result::AppResult;
use skybook_entity::user::{CreateUser, Role, User};

use crate::store::FailedLoginOutcome;

use super::map_insert_error;

/// Repository for user rows and their role assignments.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))?;
        self.with_roles(user).await
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })?;
        self.with_roles(user).await
    }

    /// Check whether a username exists.
    pub async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check username", e)
            })
    }

    /// Check whether an email exists.
    pub async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check email", e))
    }

    /// Insert a user and its role assignments in one transaction.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash, password_changed_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, "Username or email is already taken", "Failed to create user"))?;

        let names: Vec<String> = data.roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) \
             SELECT $1, id FROM roles WHERE name = ANY($2) ON CONFLICT DO NOTHING",
        )
        .bind(user.id)
        .bind(&names)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign roles", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit user creation", e)
        })?;

        user.roles = data.roles.clone();
        Ok(user)
    }

    /// Enable or disable an account.
    pub async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<()> {
        sqlx::query("UPDATE users SET enabled = $2 WHERE id = $1")
            .bind(user_id)
            .bind(enabled)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user", e))?;
        Ok(())
    }

    /// Record one failed login in a single statement. The row is locked
    /// first so `already_locked` and the `SET` expressions read the same
    /// version.
    pub async fn record_failed_login(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
    ) -> AppResult<FailedLoginOutcome> {
        let row: Option<(i32, Option<DateTime<Utc>>, bool)> = sqlx::query_as(
            "WITH prev AS ( \
               SELECT id, COALESCE(lock_until > $2, FALSE) AS already_locked \
               FROM users WHERE id = $1 FOR UPDATE) \
             UPDATE users u SET \
               failed_login_attempts = CASE \
                 WHEN u.lock_until > $2 THEN u.failed_login_attempts \
                 WHEN u.lock_until IS NOT NULL THEN 1 \
                 ELSE u.failed_login_attempts + 1 END, \
               lock_until = CASE \
                 WHEN u.lock_until > $2 THEN u.lock_until \
                 WHEN u.lock_until IS NOT NULL THEN CASE WHEN 1 >= $3 THEN $4 END \
                 WHEN u.failed_login_attempts + 1 >= $3 THEN $4 \
                 ELSE NULL END \
             FROM prev WHERE u.id = prev.id \
             RETURNING u.failed_login_attempts, u.lock_until, prev.already_locked",
        )
        .bind(user_id)
        .bind(now)
        .bind(max_attempts)
        .bind(lock_until)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record failed login", e)
        })?;

        let (attempts, lock_until, already_locked) =
            row.ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        Ok(FailedLoginOutcome {
            attempts,
            lock_until,
            already_locked,
        })
    }

    /// Reset lockout state after a successful login, unless a lock is
    /// active at `now`.
    pub async fn reset_login_state(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, lock_until = NULL, last_login_at = $2 \
             WHERE id = $1 AND (lock_until IS NULL OR lock_until <= $2)",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset login state", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Increment the session epoch.
    pub async fn bump_session_epoch(&self, user_id: Uuid) -> AppResult<i32> {
        let epoch: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET session_epoch = session_epoch + 1 WHERE id = $1 \
             RETURNING session_epoch",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to bump session epoch", e)
        })?;
        epoch.ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Update the password hash and bump the session epoch.
    pub async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, password_changed_at = $3, \
             session_epoch = session_epoch + 1 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .bind(changed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update password", e)
            })?;
        Ok(())
    }

    async fn with_roles(&self, user: Option<User>) -> AppResult<Option<User>> {
        let Some(mut user) = user else {
            return Ok(None);
        };
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT r.name FROM roles r JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user roles", e))?;

        user.roles = names.iter().filter_map(|n| Role::from_authority(n)).collect();
        Ok(Some(user))
    }
}
