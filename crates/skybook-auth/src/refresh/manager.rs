//! Refresh token lifecycle: mint, redeem (single use), revoke, list.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use skybook_core::config::MAX_TOKEN_TTL_SECONDS;
use skybook_core::error::AppError;
use skybook_core::traits::Clock;
use skybook_database::CredentialStore;
use skybook_entity::token::{NewRefreshToken, RefreshTokenRecord};
use skybook_entity::user::User;

use super::token::{generate_refresh_token, hash_refresh_token, truncate_chars};
use crate::types::ClientMeta;

/// Maximum stored User-Agent length in characters.
const MAX_USER_AGENT_CHARS: usize = 300;
/// Maximum stored IP address length in characters.
const MAX_IP_CHARS: usize = 60;

/// A freshly minted token. The plaintext is not recoverable afterwards.
#[derive(Debug, Clone)]
pub struct MintedRefreshToken {
    /// Plaintext to hand to the client.
    pub plaintext: String,
    /// The stored record.
    pub record: RefreshTokenRecord,
}

/// Mints, rotates and revokes refresh tokens.
///
/// `redeem` and `mint` are separate calls. The orchestrator chains them.
/// Every token carries its owner's session epoch from before the redeem or
/// password check, so a revoke-all that lands between the two calls still
/// kills the replacement.
#[derive(Debug, Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl RefreshTokenManager {
    /// Creates a manager issuing tokens valid for `ttl_seconds`.
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>, ttl_seconds: u64) -> Self {
        let ttl = Duration::seconds(ttl_seconds.min(MAX_TOKEN_TTL_SECONDS) as i64);
        Self { store, clock, ttl }
    }

    /// Generates, hashes and stores a new token under the epoch in `user`.
    pub async fn mint(
        &self,
        user: &User,
        device_id: Option<&str>,
        meta: &ClientMeta,
    ) -> Result<MintedRefreshToken, AppError> {
        let now = self.clock.now();
        let plaintext = generate_refresh_token();

        let record = self
            .store
            .insert_refresh_token(&NewRefreshToken {
                user_id: user.id,
                token_hash: hash_refresh_token(&plaintext),
                device_id: device_id.map(str::to_string),
                user_agent: meta
                    .user_agent
                    .as_deref()
                    .map(|ua| truncate_chars(ua, MAX_USER_AGENT_CHARS)),
                ip_address: meta
                    .ip_address
                    .as_deref()
                    .map(|ip| truncate_chars(ip, MAX_IP_CHARS)),
                created_at: now,
                expires_at: now + self.ttl,
                session_epoch: user.session_epoch,
            })
            .await?;

        Ok(MintedRefreshToken { plaintext, record })
    }

    /// Consumes a token and returns its owner and the consumed record.
    ///
    /// Unknown, revoked, expired, superseded by a revoke-all, or concurrently
    /// consumed tokens fail with `InvalidToken`. A caller-supplied device id that differs from the
    /// record's fails with `DeviceMismatch` and leaves the token usable.
    pub async fn redeem(
        &self,
        plaintext: &str,
        device_id: Option<&str>,
    ) -> Result<(User, RefreshTokenRecord), AppError> {
        let now = self.clock.now();
        let Some(record) = self
            .store
            .find_refresh_token_by_hash(&hash_refresh_token(plaintext))
            .await?
        else {
            warn!("Refresh attempted with unknown token");
            return Err(AppError::invalid_token("Invalid refresh token"));
        };

        if record.is_revoked() {
            warn!(
                session_id = %record.id,
                user_id = %record.user_id,
                "Refresh attempted with revoked token"
            );
            return Err(AppError::invalid_token("Refresh token has been revoked"));
        }
        if !record.is_active(now) {
            warn!(session_id = %record.id, user_id = %record.user_id, "Refresh token expired");
            return Err(AppError::invalid_token("Refresh token has expired"));
        }

        if let (Some(requested), Some(bound)) = (device_id, record.device_id.as_deref()) {
            if requested != bound {
                warn!(
                    session_id = %record.id,
                    user_id = %record.user_id,
                    "Refresh token presented from a different device"
                );
                return Err(AppError::device_mismatch());
            }
        }

        // Read before consuming: the epoch seen here is the one the
        // replacement is minted under.
        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await?
            .ok_or_else(|| AppError::invalid_token("Invalid refresh token"))?;
        if !record.is_current_epoch(user.session_epoch) {
            warn!(
                session_id = %record.id,
                user_id = %record.user_id,
                "Refresh attempted with token from before a revoke-all"
            );
            return Err(AppError::invalid_token("Refresh token has been revoked"));
        }

        if !self.store.consume_refresh_token(record.id, now).await? {
            warn!(
                session_id = %record.id,
                user_id = %record.user_id,
                "Refresh token lost a concurrent redemption"
            );
            return Err(AppError::invalid_token("Refresh token has been revoked"));
        }

        Ok((user, record))
    }

    /// Revokes one record. Returns whether it was still unrevoked.
    pub async fn revoke(&self, record_id: Uuid) -> Result<bool, AppError> {
        self.store
            .revoke_refresh_token(record_id, self.clock.now())
            .await
    }

    /// Revokes the record matching a plaintext token, if any.
    pub async fn revoke_by_token(&self, plaintext: &str) -> Result<bool, AppError> {
        match self
            .store
            .find_refresh_token_by_hash(&hash_refresh_token(plaintext))
            .await?
        {
            Some(record) => self.revoke(record.id).await,
            None => Ok(false),
        }
    }

    /// Moves the user's session epoch, then revokes every unrevoked record.
    /// Returns how many records changed.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, AppError> {
        self.store.bump_session_epoch(user_id).await?;
        let records = self.store.list_refresh_tokens_by_user(user_id, None).await?;
        let revoked = self.revoke_records(records).await?;
        info!(user_id = %user_id, revoked, "Revoked all sessions for user");
        Ok(revoked)
    }

    /// Revokes every unrevoked record of a user bound to `device_id`.
    pub async fn revoke_all_for_device(
        &self,
        user_id: Uuid,
        device_id: &str,
    ) -> Result<usize, AppError> {
        let records = self
            .store
            .list_refresh_tokens_by_user(user_id, Some(device_id))
            .await?;
        let revoked = self.revoke_records(records).await?;
        info!(user_id = %user_id, device_id = %device_id, revoked, "Revoked device sessions");
        Ok(revoked)
    }

    /// Active records of the current epoch, newest first.
    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<RefreshTokenRecord>, AppError> {
        let Some(user) = self.store.find_user_by_id(user_id).await? else {
            return Ok(Vec::new());
        };
        let mut records = self
            .store
            .list_active_refresh_tokens(user_id, self.clock.now())
            .await?;
        records.retain(|r| r.is_current_epoch(user.session_epoch));
        Ok(records)
    }

    /// Looks up a record by id.
    pub async fn find(&self, record_id: Uuid) -> Result<Option<RefreshTokenRecord>, AppError> {
        self.store.find_refresh_token_by_id(record_id).await
    }

    async fn revoke_records(&self, records: Vec<RefreshTokenRecord>) -> Result<usize, AppError> {
        let now = self.clock.now();
        let mut revoked = 0;
        for record in records.iter().filter(|r| !r.is_revoked()) {
            if self.store.revoke_refresh_token(record.id, now).await? {
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
