//! Authentication orchestrator: register, login, refresh, logout, sessions
//! and password change.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use skybook_core::config::auth::AuthConfig;
use skybook_core::error::AppError;
use skybook_core::traits::Clock;
use skybook_database::CredentialStore;
use skybook_entity::user::{CreateUser, Role, User};

use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::lockout::LockoutTracker;
use crate::password::{PasswordHasher, PasswordHistoryChecker, PasswordPolicy};
use crate::refresh::RefreshTokenManager;
use crate::types::{AuthResult, ClientMeta, Registration, SessionSummary};

/// Hashed once at construction and verified against for unknown usernames.
const DUMMY_PASSWORD: &str = "skybook-dummy-password-for-timing";

/// The component HTTP handlers call. Composes hashing, signing, refresh
/// tokens, lockout and password policy over one credential store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    refresh: RefreshTokenManager,
    lockout: LockoutTracker,
    policy: PasswordPolicy,
    history: PasswordHistoryChecker,
    dummy_hash: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish()
    }
}

impl AuthService {
    /// Wires every component from the auth configuration.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let hasher = Arc::new(PasswordHasher::new(&config.hashing)?);
        let dummy_hash = hasher.hash_password(DUMMY_PASSWORD)?;

        Ok(Self {
            refresh: RefreshTokenManager::new(
                store.clone(),
                clock.clone(),
                config.refresh_token_ttl_seconds,
            ),
            lockout: LockoutTracker::new(
                store.clone(),
                clock.clone(),
                config.max_failed_attempts,
                config.lock_minutes,
            ),
            policy: PasswordPolicy::new(&config.password),
            history: PasswordHistoryChecker::new(
                store.clone(),
                hasher.clone(),
                config.password.history_depth,
            ),
            encoder: Arc::new(JwtEncoder::new(config)),
            decoder: Arc::new(JwtDecoder::new(config, clock.clone())),
            store,
            clock,
            hasher,
            dummy_hash,
        })
    }

    /// The credential store this service writes to.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Creates an account. No tokens are issued.
    pub async fn register(&self, input: Registration) -> Result<User, AppError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();
        if username.is_empty() || email.is_empty() {
            return Err(AppError::validation("Username and email are required"));
        }

        if self.store.exists_by_username(&username).await? {
            return Err(AppError::conflict("Username is already taken"));
        }
        if self.store.exists_by_email(&email).await? {
            return Err(AppError::conflict("Email is already in use"));
        }
        self.policy.validate(&input.password)?;

        let mut roles: Vec<Role> = input
            .roles
            .iter()
            .map(|r| Role::from_requested(r))
            .collect();
        if roles.is_empty() {
            roles.push(Role::User);
        }
        roles.sort();
        roles.dedup();
        for role in &roles {
            if self.store.find_role_by_name(role.as_str()).await?.is_none() {
                self.store.create_role(role.as_str()).await?;
            }
        }

        let now = self.clock.now();
        let password_hash = self.hasher.hash_password(&input.password)?;
        let user = self
            .store
            .insert_user(&CreateUser {
                username,
                email,
                password_hash: password_hash.clone(),
                roles,
                created_at: now,
            })
            .await?;
        self.store
            .append_password_history(user.id, &password_hash, now)
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues an access token and a refresh token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        device_id: Option<&str>,
        meta: &ClientMeta,
    ) -> Result<AuthResult, AppError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            // Same work and same error as a wrong password.
            let _ = self.hasher.verify_password(password, &self.dummy_hash);
            warn!("Login failed: unknown username");
            return Err(AppError::invalid_credentials());
        };

        if !user.enabled {
            warn!(user_id = %user.id, "Login refused: account disabled");
            return Err(AppError::account_disabled());
        }
        if let Err(e) = self.lockout.check(&user) {
            warn!(user_id = %user.id, "Login refused: account locked");
            return Err(e);
        }

        // `user` may be stale here; the store re-checks the lock on both paths.
        if !self.hasher.verify_password(password, &user.password_hash)? {
            self.lockout.record_failure(&user).await?;
            return Err(AppError::invalid_credentials());
        }

        self.lockout.record_success(&user).await?;
        let result = self.issue(&user, device_id, meta).await?;
        info!(user_id = %user.id, device_id = ?device_id, "User logged in");
        Ok(result)
    }

    /// Rotates a refresh token: the presented one dies, a new pair is issued.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        device_id: Option<&str>,
        meta: &ClientMeta,
    ) -> Result<AuthResult, AppError> {
        let (user, old) = self.refresh.redeem(refresh_token, device_id).await?;

        if !user.enabled {
            warn!(user_id = %user.id, "Refresh refused: account disabled");
            return Err(AppError::account_disabled());
        }

        let device = old.device_id.as_deref().or(device_id);
        let result = self.issue(&user, device, meta).await?;
        info!(user_id = %user.id, previous_session = %old.id, "Refresh token rotated");
        Ok(result)
    }

    /// Revokes the session behind a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        if self.refresh.revoke_by_token(refresh_token).await? {
            info!("Session logged out");
        }
        Ok(())
    }

    /// Revokes every session of a user.
    pub async fn logout_all(&self, user_id: Uuid) -> Result<usize, AppError> {
        self.refresh.revoke_all_for_user(user_id).await
    }

    /// Revokes every session of a user on one device.
    pub async fn logout_device(&self, user_id: Uuid, device_id: &str) -> Result<usize, AppError> {
        self.refresh.revoke_all_for_device(user_id, device_id).await
    }

    /// Active sessions, newest first, without secrets.
    pub async fn list_active_sessions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SessionSummary>, AppError> {
        Ok(self
            .refresh
            .list_active(user_id)
            .await?
            .into_iter()
            .map(SessionSummary::from)
            .collect())
    }

    /// Revokes one of the caller's own sessions.
    pub async fn revoke_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), AppError> {
        let record = self
            .refresh
            .find(session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))?;
        if record.user_id != user_id {
            warn!(user_id = %user_id, session_id = %session_id, "Attempt to revoke another user's session");
            return Err(AppError::forbidden("Session does not belong to the current user"));
        }
        if self.refresh.revoke(session_id).await? {
            info!(user_id = %user_id, session_id = %session_id, "Session revoked");
        }
        Ok(())
    }

    /// Changes the password and ends every existing session.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("User no longer exists"))?;

        if !self
            .hasher
            .verify_password(current_password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Password change refused: wrong current password");
            return Err(AppError::invalid_credentials());
        }

        self.policy.validate(new_password)?;
        self.history.check_reuse(user.id, new_password).await?;

        let now = self.clock.now();
        let new_hash = self.hasher.hash_password(new_password)?;
        self.store.update_password(user.id, &new_hash, now).await?;
        self.store
            .append_password_history(user.id, &new_hash, now)
            .await?;
        let revoked = self.logout_all(user.id).await?;

        info!(user_id = %user.id, revoked_sessions = revoked, "Password changed");
        Ok(())
    }

    /// Validates an access token and resolves the current user.
    ///
    /// Rejects tokens for users that no longer exist or are disabled, and
    /// tokens issued before the last password change.
    pub async fn authenticate(&self, access_token: &str) -> Result<(Claims, User), AppError> {
        let claims = self.decoder.decode_access_token(access_token)?;
        let user = self
            .store
            .find_user_by_username(claims.username())
            .await?
            .ok_or_else(|| AppError::unauthenticated("User no longer exists"))?;

        if !user.enabled {
            return Err(AppError::account_disabled());
        }
        // `iat` has whole-second precision: an access token issued earlier
        // in the same second as the change still passes until it expires.
        if claims.iat < user.password_changed_at.timestamp() {
            return Err(AppError::unauthenticated(
                "Token was issued before the last password change",
            ));
        }
        Ok((claims, user))
    }

    async fn issue(
        &self,
        user: &User,
        device_id: Option<&str>,
        meta: &ClientMeta,
    ) -> Result<AuthResult, AppError> {
        let roles = user.authorities();
        let access = self
            .encoder
            .issue_access_token(&user.username, &roles, self.clock.now())?;
        let minted = self.refresh.mint(user, device_id, meta).await?;

        Ok(AuthResult {
            access_token: access.token,
            access_token_expires_in_seconds: access.expires_in_seconds,
            refresh_token: minted.plaintext,
            username: user.username.clone(),
            roles,
        })
    }
}
