//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod logging;
pub mod rate_limit;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::logging::LoggingConfig;
use self::rate_limit::RateLimitConfig;

use crate::error::AppError;

/// Minimum accepted length of the JWT signing secret, in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Upper bound for both token lifetimes (ten years).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 315_360_000;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Rate limiter settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Without it the in-process store is used.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Apply pending migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            run_migrations: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SKYBOOK__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SKYBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations the server cannot run safely with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_BYTES} bytes"
            )));
        }
        if self.auth.max_failed_attempts < 1 {
            return Err(AppError::configuration(
                "auth.max_failed_attempts must be at least 1",
            ));
        }
        if self.auth.lock_minutes < 1 {
            return Err(AppError::configuration("auth.lock_minutes must be at least 1"));
        }
        for ttl in [
            self.auth.access_token_ttl_seconds,
            self.auth.refresh_token_ttl_seconds,
        ] {
            if ttl == 0 || ttl > MAX_TOKEN_TTL_SECONDS {
                return Err(AppError::configuration(format!(
                    "token TTLs must be between 1 and {MAX_TOKEN_TTL_SECONDS} seconds"
                )));
            }
        }
        if self.auth.password.min_strength_score > 4 {
            return Err(AppError::configuration(
                "auth.password.min_strength_score must be between 0 and 4",
            ));
        }
        for (name, bucket) in [
            ("login", &self.rate_limit.login),
            ("refresh", &self.rate_limit.refresh),
        ] {
            if bucket.capacity == 0 || bucket.refill_per_minute == 0 {
                return Err(AppError::configuration(format!(
                    "rate_limit.{name} capacity and refill_per_minute must be positive"
                )));
            }
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
