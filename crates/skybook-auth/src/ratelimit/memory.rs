//! In-process rate limiter for single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;

use skybook_core::config::rate_limit::RateLimitConfig;
use skybook_core::error::AppError;
use skybook_core::traits::Clock;

use super::bucket::{Admission, TokenBucket};
use super::limiter::{EndpointGroup, RateLimiter};

/// Buckets held in a sharded concurrent map.
///
/// Buckets are created on first use and never evicted, so memory grows with
/// the number of distinct client keys seen over the process lifetime.
#[derive(Debug)]
pub struct LocalRateLimiter {
    buckets: DashMap<(EndpointGroup, String), TokenBucket>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl LocalRateLimiter {
    /// Creates an empty limiter.
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
            clock,
        }
    }

    /// Number of buckets created so far.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[async_trait]
impl RateLimiter for LocalRateLimiter {
    async fn try_consume(
        &self,
        group: EndpointGroup,
        client_key: &str,
    ) -> Result<Admission, AppError> {
        let shape = group.bucket(&self.config);
        let now = self.clock.now();

        // The entry guard holds the shard lock for the refill-and-take step.
        let admission = self
            .buckets
            .entry((group, client_key.to_string()))
            .or_insert_with(|| TokenBucket::full(shape.capacity, now))
            .try_take(now, shape.capacity, shape.refill_per_second());

        if let Admission::Denied {
            retry_after_seconds,
        } = admission
        {
            warn!(
                group = %group,
                client = %client_key,
                retry_after_seconds,
                "Rate limit exceeded"
            );
        }
        Ok(admission)
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skybook_core::ManualClock;

    fn limiter() -> (LocalRateLimiter, ManualClock) {
        let clock = ManualClock::default();
        (
            LocalRateLimiter::new(RateLimitConfig::default(), Arc::new(clock.clone())),
            clock,
        )
    }

    #[tokio::test]
    async fn test_sixth_login_is_denied_until_refill() {
        let (limiter, clock) = limiter();
        for _ in 0..5 {
            assert!(limiter.try_consume(EndpointGroup::Login, "10.0.0.1").await.unwrap().is_admitted());
        }
        match limiter.try_consume(EndpointGroup::Login, "10.0.0.1").await.unwrap() {
            Admission::Denied { retry_after_seconds } => assert!(retry_after_seconds > 0),
            other => panic!("expected denial, got {other:?}"),
        }

        clock.advance(Duration::minutes(1));
        assert!(limiter.try_consume(EndpointGroup::Login, "10.0.0.1").await.unwrap().is_admitted());
    }

    #[tokio::test]
    async fn test_keys_and_groups_are_independent() {
        let (limiter, _clock) = limiter();
        for _ in 0..5 {
            limiter.try_consume(EndpointGroup::Login, "a").await.unwrap();
        }
        assert!(!limiter.try_consume(EndpointGroup::Login, "a").await.unwrap().is_admitted());
        assert!(limiter.try_consume(EndpointGroup::Login, "b").await.unwrap().is_admitted());
        assert!(limiter.try_consume(EndpointGroup::Refresh, "a").await.unwrap().is_admitted());
        assert_eq!(limiter.bucket_count(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consumers_never_exceed_capacity() {
        let (limiter, _clock) = limiter();
        let limiter = Arc::new(limiter);
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter
                        .try_consume(EndpointGroup::Refresh, "shared")
                        .await
                        .unwrap()
                        .is_admitted()
                })
            })
            .collect();
        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}
