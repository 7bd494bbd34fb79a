//! Role enumeration.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// The fixed set of roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Base role every account gets when nothing else is requested.
    #[serde(rename = "ROLE_USER")]
    User,
    /// Administrator.
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    /// Event attendee.
    #[serde(rename = "ROLE_ATTENDEE")]
    Attendee,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Attendee];

    /// The stored authority name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
            Self::Attendee => "ROLE_ATTENDEE",
        }
    }

    /// Map free-text role input to a role. Case-insensitive, an optional
    /// `ROLE_` prefix is accepted, and anything unrecognised becomes
    /// [`Role::User`].
    pub fn from_requested(input: &str) -> Self {
        let lowered = input.trim().to_lowercase();
        let bare = lowered.strip_prefix("role_").unwrap_or(&lowered);
        match bare {
            "admin" => Self::Admin,
            "attendee" => Self::Attendee,
            _ => Self::User,
        }
    }

    /// Exact inverse of [`Role::as_str`].
    pub fn from_authority(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row of the `roles` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleRecord {
    /// Role identifier.
    pub id: Uuid,
    /// Authority name, e.g. `ROLE_USER`.
    pub name: String,
}
