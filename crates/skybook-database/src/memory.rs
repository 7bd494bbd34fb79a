//! In-process credential store.
//!
//! All state sits behind one `RwLock`, so every trait operation is atomic
//! with respect to every other. Used by tests and by the server when no
//! database URL is configured; nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use skybook_core::{AppError, AppResult};
use skybook_entity::password::PasswordHistoryEntry;
use skybook_entity::token::{NewRefreshToken, RefreshTokenRecord};
use skybook_entity::user::{CreateUser, RoleRecord, User};

use crate::store::{CredentialStore, FailedLoginOutcome};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    roles: HashMap<String, RoleRecord>,
    history: Vec<PasswordHistoryEntry>,
    tokens: HashMap<Uuid, RefreshTokenRecord>,
}

impl Inner {
    fn user_mut(&mut self, id: Uuid) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }
}

/// Credential store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|u| u.email == email))
    }

    async fn insert_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict("Username is already taken"));
        }
        if inner.users.values().any(|u| u.email == data.email) {
            return Err(AppError::conflict("Email is already in use"));
        }
        let user = User {
            id: Uuid::now_v7(),
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            roles: data.roles.clone(),
            failed_login_attempts: 0,
            lock_until: None,
            password_changed_at: data.created_at,
            last_login_at: None,
            enabled: true,
            session_epoch: 0,
            created_at: data.created_at,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_user_enabled(&self, user_id: Uuid, enabled: bool) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.user_mut(user_id)?.enabled = enabled;
        Ok(())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.inner.read().await.roles.get(name).cloned())
    }

    async fn create_role(&self, name: &str) -> AppResult<RoleRecord> {
        let mut inner = self.inner.write().await;
        let record = inner
            .roles
            .entry(name.to_string())
            .or_insert_with(|| RoleRecord {
                id: Uuid::now_v7(),
                name: name.to_string(),
            });
        Ok(record.clone())
    }

    async fn record_failed_login(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
    ) -> AppResult<FailedLoginOutcome> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;

        let already_locked = user.is_locked_at(now);
        match user.lock_until {
            Some(_) if already_locked => {}
            Some(_) => {
                user.failed_login_attempts = 1;
                user.lock_until = None;
            }
            None => user.failed_login_attempts += 1,
        }
        if user.lock_until.is_none() && user.failed_login_attempts >= max_attempts {
            user.lock_until = Some(lock_until);
        }

        Ok(FailedLoginOutcome {
            attempts: user.failed_login_attempts,
            lock_until: user.lock_until,
            already_locked,
        })
    }

    async fn reset_login_state(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;
        if user.is_locked_at(now) {
            return Ok(false);
        }
        user.failed_login_attempts = 0;
        user.lock_until = None;
        user.last_login_at = Some(now);
        Ok(true)
    }

    async fn bump_session_epoch(&self, user_id: Uuid) -> AppResult<i32> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;
        user.session_epoch += 1;
        Ok(user.session_epoch)
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;
        user.password_hash = password_hash.to_string();
        user.password_changed_at = changed_at;
        user.session_epoch += 1;
        Ok(())
    }

    async fn append_password_history(
        &self,
        user_id: Uuid,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.history.push(PasswordHistoryEntry {
            id: Uuid::now_v7(),
            user_id,
            password_hash: password_hash.to_string(),
            created_at,
        });
        Ok(())
    }

    async fn recent_password_hashes(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        // Entries are appended in time order, so newest-first is a reverse scan.
        Ok(inner
            .history
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .map(|e| e.password_hash.clone())
            .collect())
    }

    async fn insert_refresh_token(&self, data: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        let mut inner = self.inner.write().await;
        if inner.tokens.values().any(|t| t.token_hash == data.token_hash) {
            return Err(AppError::conflict("Refresh token hash collision"));
        }
        let record = RefreshTokenRecord {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            token_hash: data.token_hash.clone(),
            device_id: data.device_id.clone(),
            user_agent: data.user_agent.clone(),
            ip_address: data.ip_address.clone(),
            created_at: data.created_at,
            expires_at: data.expires_at,
            revoked_at: None,
            last_used_at: None,
            session_epoch: data.session_epoch,
        };
        inner.tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_refresh_token_by_hash(
        &self,
        hash: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.tokens.values().find(|t| t.token_hash == hash).cloned())
    }

    async fn find_refresh_token_by_id(&self, id: Uuid) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.inner.read().await.tokens.get(&id).cloned())
    }

    async fn consume_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.tokens.get_mut(&id) {
            Some(record) if record.is_active(now) => {
                record.revoked_at = Some(now);
                record.last_used_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_refresh_token(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.tokens.get_mut(&id) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_refresh_tokens_by_user(
        &self,
        user_id: Uuid,
        device_id: Option<&str>,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| device_id.is_none_or(|d| t.device_id.as_deref() == Some(d)))
            .cloned()
            .collect())
    }

    async fn list_active_refresh_tokens(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        let inner = self.inner.read().await;
        let mut active: Vec<RefreshTokenRecord> = inner
            .tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_active(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(active)
    }
}
