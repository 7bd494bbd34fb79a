//! Refresh token record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored refresh token. Only the SHA-256 of the opaque value is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Record identifier; doubles as the session id.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Lowercase hex SHA-256 of the plaintext token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Client-supplied device identifier.
    pub device_id: Option<String>,
    /// User-Agent at issue time (best effort).
    pub user_agent: Option<String>,
    /// Client IP at issue time (best effort).
    pub ip_address: Option<String>,
    /// When the token was minted.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Set once the token is revoked or consumed.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Set when the token is redeemed.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Owner's session epoch at mint time.
    pub session_epoch: i32,
}

impl RefreshTokenRecord {
    /// Active means not revoked and expiring strictly after `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// Whether the record has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the record survived every revoke-all of its owner.
    pub fn is_current_epoch(&self, user_epoch: i32) -> bool {
        self.session_epoch == user_epoch
    }
}

/// Data required to persist a freshly minted refresh token.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    /// Owning user.
    pub user_id: Uuid,
    /// Hash of the plaintext.
    pub token_hash: String,
    /// Device binding.
    pub device_id: Option<String>,
    /// Truncated User-Agent.
    pub user_agent: Option<String>,
    /// Truncated IP.
    pub ip_address: Option<String>,
    /// Mint instant.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Owner's session epoch, read before the password check or the
    /// consumption of the previous token.
    pub session_epoch: i32,
}
