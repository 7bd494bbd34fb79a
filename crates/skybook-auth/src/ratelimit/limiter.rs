//! Rate limiter trait, endpoint groups and backend selection.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use skybook_core::config::rate_limit::{BucketConfig, RateLimitConfig};
use skybook_core::error::AppError;
use skybook_core::traits::Clock;

use super::bucket::Admission;
use super::memory::LocalRateLimiter;

/// Groups of endpoints sharing one bucket per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointGroup {
    /// `login` and `signin`.
    Login,
    /// `refresh`.
    Refresh,
}

impl EndpointGroup {
    /// Key segment for this group.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Refresh => "refresh",
        }
    }

    /// The configured bucket shape for this group.
    pub fn bucket(&self, config: &RateLimitConfig) -> BucketConfig {
        match self {
            Self::Login => config.login,
            Self::Refresh => config.refresh,
        }
    }
}

impl fmt::Display for EndpointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-(group, client) token-bucket admission control.
///
/// Implementations must make the refill-and-take step atomic per key.
#[async_trait]
pub trait RateLimiter: Send + Sync + fmt::Debug {
    /// Takes one token from the bucket of `(group, client_key)`.
    async fn try_consume(
        &self,
        group: EndpointGroup,
        client_key: &str,
    ) -> Result<Admission, AppError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Builds the configured backing: Redis when `redis_url` is set, otherwise
/// the in-process limiter.
pub async fn build_rate_limiter(
    config: &RateLimitConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn RateLimiter>, AppError> {
    let limiter: Arc<dyn RateLimiter> = match config.redis_url.as_deref() {
        #[cfg(feature = "redis-limiter")]
        Some(url) => Arc::new(super::redis::RedisRateLimiter::connect(url, config.clone()).await?),
        #[cfg(not(feature = "redis-limiter"))]
        Some(_) => {
            return Err(AppError::configuration(
                "rate_limit.redis_url is set but Redis support is not compiled in",
            ));
        }
        None => Arc::new(LocalRateLimiter::new(config.clone(), clock)),
    };
    info!(backend = limiter.backend(), "Rate limiter initialized");
    Ok(limiter)
}
