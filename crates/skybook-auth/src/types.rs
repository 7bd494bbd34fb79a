//! Values passed into and returned from the authentication operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skybook_entity::token::RefreshTokenRecord;

/// Best-effort, unauthenticated client metadata recorded with a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Peer address.
    pub ip_address: Option<String>,
}

/// Tokens issued by a successful login or refresh.
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Signed access token.
    pub access_token: String,
    /// Access token lifetime.
    pub access_token_expires_in_seconds: u64,
    /// Opaque refresh token, shown exactly once.
    pub refresh_token: String,
    /// Authenticated username.
    pub username: String,
    /// Sorted authority names.
    pub roles: Vec<String>,
}

/// Input for account registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role names; empty means the default role.
    pub roles: Vec<String>,
}

/// A session as shown to its owner. Never carries the token or its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session (record) id.
    pub id: Uuid,
    /// Device binding.
    pub device_id: Option<String>,
    /// IP at issue time.
    pub ip_address: Option<String>,
    /// User-Agent at issue time.
    pub user_agent: Option<String>,
    /// Issue instant.
    pub created_at: DateTime<Utc>,
    /// Last redemption.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl From<RefreshTokenRecord> for SessionSummary {
    fn from(record: RefreshTokenRecord) -> Self {
        Self {
            id: record.id,
            device_id: record.device_id,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            created_at: record.created_at,
            last_used_at: record.last_used_at,
            expires_at: record.expires_at,
        }
    }
}
