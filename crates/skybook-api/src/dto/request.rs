//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registration body, also accepted on `/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 50, message = "must be 3 to 50 characters"))]
    pub username: String,
    /// Email.
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub email: String,
    /// Password. Strength rules are applied by the password policy.
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub password: String,
    /// Requested roles, e.g. `["admin"]`. Unknown names fall back to the base role.
    #[serde(default, alias = "role")]
    pub roles: Vec<String>,
}

/// Login body, also accepted on `/signin`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Token refresh body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
    /// Device id; the `X-Device-Id` header is used when absent.
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Logout body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Refresh token to revoke.
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

/// Logout-device body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutDeviceRequest {
    /// Device whose sessions end.
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub device_id: String,
}

/// Revoke-session body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionRequest {
    /// Session (refresh token record) id.
    pub session_id: Uuid,
}

/// Password change body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub new_password: String,
}
