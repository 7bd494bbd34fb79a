//! Authentication configuration.
//!
//! This is also where the signing key lives. It is read once at startup and
//! handed to the token signer through its constructor.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). At least 32 bytes.
    #[serde(default)]
    pub jwt_secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_seconds: u64,
    /// Refresh token TTL in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_seconds: u64,
    /// Maximum failed login attempts before lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Account lockout duration in minutes.
    #[serde(default = "default_lock_minutes")]
    pub lock_minutes: i64,
    /// Password policy settings.
    #[serde(default)]
    pub password: PasswordPolicyConfig,
    /// Argon2 cost parameters.
    #[serde(default)]
    pub hashing: HashingConfig,
}

/// Password strength and reuse settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Minimum password length in characters.
    #[serde(default = "default_password_min")]
    pub min_length: usize,
    /// How many previous hashes are checked for reuse.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Minimum zxcvbn score (1-4). 0 disables the estimate.
    #[serde(default)]
    pub min_strength_score: u8,
    /// Extra blocklist entries merged into the built-in list.
    #[serde(default)]
    pub blocklist: Vec<String>,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            access_token_ttl_seconds: default_access_ttl(),
            refresh_token_ttl_seconds: default_refresh_ttl(),
            max_failed_attempts: default_max_failed(),
            lock_minutes: default_lock_minutes(),
            password: PasswordPolicyConfig::default(),
            hashing: HashingConfig::default(),
        }
    }
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: default_password_min(),
            history_depth: default_history_depth(),
            min_strength_score: 0,
            blocklist: Vec::new(),
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_issuer() -> String {
    "skybook".to_string()
}

fn default_access_ttl() -> u64 {
    900
}

fn default_refresh_ttl() -> u64 {
    604_800
}

fn default_max_failed() -> i32 {
    5
}

fn default_lock_minutes() -> i64 {
    15
}

fn default_password_min() -> usize {
    10
}

fn default_history_depth() -> usize {
    5
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
