//! Redis-backed rate limiter using a Lua script for atomicity.
//!
//! Suitable for multi-node deployments: every instance draws from the same
//! bucket per key. Refill uses the Redis server clock so instances with
//! skewed clocks still agree.

use async_trait::async_trait;
use tracing::{error, info, warn};

use skybook_core::config::rate_limit::RateLimitConfig;
use skybook_core::error::{AppError, ErrorKind};

use super::bucket::Admission;
use super::limiter::{EndpointGroup, RateLimiter};

/// Lua script for atomic refill-and-take.
///
/// KEYS[1] = bucket hash
/// ARGV[1] = capacity
/// ARGV[2] = refill rate in tokens per millisecond
///
/// Returns `{admitted (1|0), retry_after_ms, remaining}`. The key expires
/// once it would have refilled to capacity.
const TAKE_SCRIPT: &str = r#"
    local key = KEYS[1]
    local capacity = tonumber(ARGV[1])
    local rate = tonumber(ARGV[2])

    local time = redis.call('TIME')
    local now = tonumber(time[1]) * 1000 + math.floor(tonumber(time[2]) / 1000)

    local state = redis.call('HMGET', key, 'tokens', 'ts')
    local tokens = tonumber(state[1])
    local ts = tonumber(state[2])
    if tokens == nil or ts == nil then
        tokens = capacity
        ts = now
    end

    local elapsed = math.max(0, now - ts)
    tokens = math.min(capacity, tokens + elapsed * rate)

    local admitted = 0
    local retry_ms = 0
    if tokens >= 1 then
        tokens = tokens - 1
        admitted = 1
    else
        retry_ms = math.ceil((1 - tokens) / rate)
    end

    redis.call('HSET', key, 'tokens', tostring(tokens), 'ts', tostring(now))
    local ttl = math.ceil((capacity - tokens) / rate)
    if ttl < 1 then
        ttl = 1
    end
    redis.call('PEXPIRE', key, ttl)

    return {admitted, retry_ms, math.floor(tokens)}
"#;

/// Redis-based rate limiter for multi-node deployments.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: redis::aio::ConnectionManager,
    script: redis::Script,
    config: RateLimitConfig,
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("key_prefix", &self.config.key_prefix)
            .finish()
    }
}

impl RedisRateLimiter {
    /// Connects to Redis and prepares the script.
    pub async fn connect(redis_url: &str, config: RateLimitConfig) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, format!("Invalid Redis URL: {e}"), e)
        })?;

        let conn = client.get_connection_manager().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Cache,
                format!("Redis connection manager failed: {e}"),
                e,
            )
        })?;

        info!(key_prefix = %config.key_prefix, "Redis rate limiter connected");

        Ok(Self {
            conn,
            script: redis::Script::new(TAKE_SCRIPT),
            config,
        })
    }

    fn key(&self, group: EndpointGroup, client_key: &str) -> String {
        format!("{}{}:{}", self.config.key_prefix, group.as_str(), client_key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn try_consume(
        &self,
        group: EndpointGroup,
        client_key: &str,
    ) -> Result<Admission, AppError> {
        let shape = group.bucket(&self.config);
        let per_ms = f64::from(shape.refill_per_minute) / 60_000.0;
        let mut conn = self.conn.clone();

        let (admitted, retry_ms, remaining): (i64, i64, i64) = self
            .script
            .key(self.key(group, client_key))
            .arg(shape.capacity)
            .arg(per_ms.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                error!(group = %group, error = %e, "Redis rate limit script failed");
                AppError::with_source(ErrorKind::Cache, "Rate limiter unavailable", e)
            })?;

        match admitted {
            1 => Ok(Admission::Admitted {
                remaining: u32::try_from(remaining.max(0)).unwrap_or(u32::MAX),
            }),
            0 => {
                let retry_after_seconds =
                    u64::try_from(retry_ms.max(0)).unwrap_or(u64::MAX).div_ceil(1000).max(1);
                warn!(
                    group = %group,
                    client = %client_key,
                    retry_after_seconds,
                    "Rate limit exceeded"
                );
                Ok(Admission::Denied {
                    retry_after_seconds,
                })
            }
            other => Err(AppError::internal(format!(
                "Unexpected rate limit script result: {other}"
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
