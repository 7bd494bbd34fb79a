//! Password history entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A previously used password hash. Entries are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordHistoryEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Argon2 hash of the password at that time.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the password was set.
    pub created_at: DateTime<Utc>,
}
