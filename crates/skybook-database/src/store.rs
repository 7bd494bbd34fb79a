//! The credential store boundary.
//!
//! Everything the authentication core persists goes through
//! [`CredentialStore`]. Operations that guard security invariants under
//! concurrency (failed-attempt counting, token consumption, revocation) are
//! single atomic operations here, never read-then-write sequences in the
//! caller.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use skybook_core::AppResult;
use skybook_entity::token::{NewRefreshToken, RefreshTokenRecord};
use skybook_entity::user::{CreateUser, RoleRecord, User};

/// Lockout state after a failed login was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLoginOutcome {
    /// Consecutive failures, including this one.
    pub attempts: i32,
    /// Set when the account is (now or still) locked.
    pub lock_until: Option<DateTime<Utc>>,
    /// The lock was already active before this attempt, which was not counted.
    pub already_locked: bool,
}

/// Durable storage for users, roles, password history and refresh tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug + 'static {
    /// Look up a user by exact username, roles included.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Look up a user by id, roles included.
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Whether the username is taken.
    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    /// Whether the email is taken.
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Insert a user and attach its roles. Fails with `Conflict` when the
    /// username or email is already taken, even if a concurrent insert won
    /// after the caller's existence checks.
    async fn insert_user(&self, data: &CreateUser) -> AppResult<User>;

    /// Enable or disable an account.
    async fn set_user_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<()>;

    /// Look up a role row by authority name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>>;

    /// Create a role row, returning the existing one if it raced.
    async fn create_role(&self, name: &str) -> AppResult<RoleRecord>;

    /// Atomically record one failed login.
    ///
    /// While `lock_until` is in the future the row is left untouched. A lock
    /// that has already expired is cleared and counting restarts at 1.
    /// Otherwise the counter is incremented, and once it reaches
    /// `max_attempts` the lock is set to `lock_until`.
    async fn record_failed_login(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
    ) -> AppResult<FailedLoginOutcome>;

    /// Zero the failure counter, clear the lock, stamp `last_login_at`.
    ///
    /// Refused while a lock is active at `now`, so a lock written after the
    /// caller read the user survives. Returns whether the reset happened.
    async fn reset_login_state(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Increment the user's session epoch and return the new value.
    ///
    /// Refresh tokens minted under an older epoch are dead, including ones
    /// whose insert was still in flight when the epoch moved.
    async fn bump_session_epoch(&self, user_id: Uuid) -> AppResult<i32>;

    /// Replace the password hash, stamp `password_changed_at` and bump the
    /// session epoch in one operation.
    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Append a password history entry.
    async fn append_password_history(
        &self,
        user_id: Uuid,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// The `limit` most recent password hashes, newest first.
    async fn recent_password_hashes(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<String>>;

    /// Persist a refresh token record.
    async fn insert_refresh_token(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord>;

    /// Look up a refresh token by the hash of its plaintext.
    async fn find_refresh_token_by_hash(&self, hash: &str)
    -> AppResult<Option<RefreshTokenRecord>>;

    /// Look up a refresh token by record id.
    async fn find_refresh_token_by_id(&self, id: Uuid) -> AppResult<Option<RefreshTokenRecord>>;

    /// Compare-and-set consumption: revoke and stamp `last_used_at` only if
    /// the record is still unrevoked and unexpired at `now`. Returns whether
    /// this call won.
    async fn consume_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke if not already revoked. Returns whether this call changed it.
    async fn revoke_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// All of a user's records, optionally restricted to one device.
    async fn list_refresh_tokens_by_user(
        &self,
        user_id: Uuid,
        device_id: Option<&str>,
    ) -> AppResult<Vec<RefreshTokenRecord>>;

    /// Active records of a user, newest first.
    async fn list_active_refresh_tokens(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<RefreshTokenRecord>>;
}
