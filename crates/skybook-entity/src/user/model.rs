//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Granted roles, loaded from the join table.
    #[sqlx(skip)]
    pub roles: Vec<Role>,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Account locked until this time (if locked).
    pub lock_until: Option<DateTime<Utc>>,
    /// When the current password was set.
    pub password_changed_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Disabled accounts cannot authenticate.
    pub enabled: bool,
    /// Incremented by logout-all and password change. Refresh tokens carry
    /// the epoch they were minted under.
    pub session_epoch: i32,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the account is locked at `now`. A lock whose instant has
    /// passed no longer counts.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| now < until)
    }

    /// Sorted authority strings, as they appear in access-token claims.
    pub fn authorities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.roles.iter().map(|r| r.as_str().to_string()).collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Roles to attach. Never empty.
    pub roles: Vec<Role>,
    /// Creation instant; also the initial `password_changed_at`.
    pub created_at: DateTime<Utc>,
}
