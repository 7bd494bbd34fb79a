//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use skybook_core::AppResult;
use skybook_entity::token::{NewRefreshToken, RefreshTokenRecord};
use skybook_entity::user::{CreateUser, RoleRecord, User};

use crate::connection::DatabasePool;
use crate::repositories::{
    PasswordHistoryRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};
use crate::store::{CredentialStore, FailedLoginOutcome};

/// Credential store composed of the per-table repositories.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    users: UserRepository,
    roles: RoleRepository,
    history: PasswordHistoryRepository,
    tokens: RefreshTokenRepository,
}

impl PgCredentialStore {
    /// Build the store on an open pool.
    pub fn new(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: UserRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            history: PasswordHistoryRepository::new(pool.clone()),
            tokens: RefreshTokenRepository::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        self.users.exists_by_username(username).await
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        self.users.exists_by_email(email).await
    }

    async fn insert_user(&self, data: &CreateUser) -> AppResult<User> {
        self.users.create(data).await
    }

    async fn set_user_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<()> {
        self.users.set_enabled(user_id, enabled).await
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        self.roles.find_by_name(name).await
    }

    async fn create_role(&self, name: &str) -> AppResult<RoleRecord> {
        self.roles.create(name).await
    }

    async fn record_failed_login(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
    ) -> AppResult<FailedLoginOutcome> {
        self.users
            .record_failed_login(user_id, now, max_attempts, lock_until)
            .await
    }

    async fn reset_login_state(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        self.users.reset_login_state(user_id, now).await
    }

    async fn bump_session_epoch(&self, user_id: Uuid) -> AppResult<i32> {
        self.users.bump_session_epoch(user_id).await
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.users
            .update_password(user_id, password_hash, changed_at)
            .await
    }

    async fn append_password_history(
        &self,
        user_id: Uuid,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.history.append(user_id, password_hash, created_at).await
    }

    async fn recent_password_hashes(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<String>> {
        self.history.recent_hashes(user_id, limit).await
    }

    async fn insert_refresh_token(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        self.tokens.create(data).await
    }

    async fn find_refresh_token_by_hash(
        &self,
        hash: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        self.tokens.find_by_hash(hash).await
    }

    async fn find_refresh_token_by_id(&self, id: Uuid) -> AppResult<Option<RefreshTokenRecord>> {
        self.tokens.find_by_id(id).await
    }

    async fn consume_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        self.tokens.consume(id, now).await
    }

    async fn revoke_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        self.tokens.revoke(id, now).await
    }

    async fn list_refresh_tokens_by_user(
        &self,
        user_id: Uuid,
        device_id: Option<&str>,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        self.tokens.find_by_user(user_id, device_id).await
    }

    async fn list_active_refresh_tokens(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        self.tokens.find_active_by_user(user_id, now).await
    }
}
