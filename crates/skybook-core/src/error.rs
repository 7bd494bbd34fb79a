//! Unified application error types for SkyBook.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The HTTP layer turns the
//! [`ErrorKind`] into a status code; nothing below it knows about HTTP.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input had the wrong shape (missing fields, malformed email, ...).
    Validation,
    /// A password failed the strength policy or was reused.
    PolicyViolation,
    /// A unique value (username, email) is already taken.
    Conflict,
    /// Wrong password or unknown user. The two are indistinguishable.
    InvalidCredentials,
    /// The account is temporarily locked after repeated failures.
    AccountLocked,
    /// The account has been disabled.
    AccountDisabled,
    /// A refresh token is unknown, revoked, or expired.
    InvalidToken,
    /// A refresh token was presented from a different device.
    DeviceMismatch,
    /// No valid access token was presented on a protected endpoint.
    Unauthenticated,
    /// The requested resource was not found.
    NotFound,
    /// The caller does not own the resource.
    Forbidden,
    /// A rate limit was exceeded.
    RateLimited,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A cache / distributed-store error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl ErrorKind {
    /// Whether this kind represents an infrastructure failure rather than
    /// an expected, typed outcome.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Internal | Self::Database | Self::Cache | Self::Configuration | Self::Serialization
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::PolicyViolation => write!(f, "POLICY_VIOLATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::AccountLocked => write!(f, "ACCOUNT_LOCKED"),
            Self::AccountDisabled => write!(f, "ACCOUNT_DISABLED"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::DeviceMismatch => write!(f, "DEVICE_MISMATCH"),
            Self::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified application error used throughout SkyBook.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Seconds the caller should wait before retrying (rate limit, lockout).
    pub retry_after_seconds: Option<u64>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after_seconds: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a retry hint in seconds.
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after_seconds = Some(seconds);
        self
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a password policy violation.
    pub fn policy_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PolicyViolation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// The single, deliberately vague credential failure.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid credentials")
    }

    /// Create an account-locked error carrying the unlock instant.
    pub fn account_locked(until: chrono::DateTime<chrono::Utc>, retry_after_seconds: u64) -> Self {
        Self::new(
            ErrorKind::AccountLocked,
            format!("Account locked until {}", until.to_rfc3339()),
        )
        .with_retry_after(retry_after_seconds)
    }

    /// Create an account-disabled error.
    pub fn account_disabled() -> Self {
        Self::new(ErrorKind::AccountDisabled, "Account disabled")
    }

    /// Create an invalid refresh token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create a device mismatch error.
    pub fn device_mismatch() -> Self {
        Self::new(ErrorKind::DeviceMismatch, "Device mismatch")
    }

    /// Create an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a rate-limited error.
    pub fn rate_limited(retry_after_seconds: u64) -> Self {
        Self::new(ErrorKind::RateLimited, "Too many requests. Retry later.")
            .with_retry_after(retry_after_seconds)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            retry_after_seconds: self.retry_after_seconds,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
