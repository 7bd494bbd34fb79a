//! Rate limiting configuration for the authentication endpoints.

use serde::{Deserialize, Serialize};

/// Rate limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether admission control is applied at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bucket for `login` / `signin`.
    #[serde(default = "default_login_bucket")]
    pub login: BucketConfig,
    /// Bucket for `refresh`.
    #[serde(default = "default_refresh_bucket")]
    pub refresh: BucketConfig,
    /// Redis URL. When set, buckets are shared across instances.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Prefix for Redis bucket keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Token bucket shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Maximum number of tokens.
    pub capacity: u32,
    /// Tokens added per minute, linearly.
    pub refill_per_minute: u32,
}

impl BucketConfig {
    /// Refill rate in tokens per second.
    pub fn refill_per_second(&self) -> f64 {
        f64::from(self.refill_per_minute) / 60.0
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            login: default_login_bucket(),
            refresh: default_refresh_bucket(),
            redis_url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_login_bucket() -> BucketConfig {
    BucketConfig {
        capacity: 5,
        refill_per_minute: 5,
    }
}

fn default_refresh_bucket() -> BucketConfig {
    BucketConfig {
        capacity: 10,
        refill_per_minute: 10,
    }
}

fn default_key_prefix() -> String {
    "skybook:ratelimit:".to_string()
}
