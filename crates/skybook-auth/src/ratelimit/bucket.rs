//! Token bucket arithmetic with linear refill.

use chrono::{DateTime, Utc};

/// Outcome of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed.
    Admitted {
        /// Whole tokens left after this request.
        remaining: u32,
    },
    /// The request is refused.
    Denied {
        /// Seconds until one token is available, at least 1.
        retry_after_seconds: u64,
    },
}

impl Admission {
    /// Whether the request was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

/// State of one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: DateTime<Utc>,
}

impl TokenBucket {
    /// A full bucket.
    pub fn full(capacity: u32, now: DateTime<Utc>) -> Self {
        Self {
            tokens: f64::from(capacity),
            last_refill: now,
        }
    }

    /// Current token count (fractional).
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// Refills for the time elapsed since the last call, then takes one
    /// token if available.
    pub fn try_take(&mut self, now: DateTime<Utc>, capacity: u32, per_second: f64) -> Admission {
        let elapsed = (now - self.last_refill).num_milliseconds().max(0) as f64 / 1000.0;
        let capacity = f64::from(capacity);
        self.tokens = (self.tokens + elapsed * per_second).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Admission::Admitted {
                remaining: self.tokens.floor() as u32,
            }
        } else {
            Admission::Denied {
                retry_after_seconds: retry_after_seconds(self.tokens, per_second),
            }
        }
    }
}

/// Seconds until the bucket holds one whole token again.
pub(crate) fn retry_after_seconds(tokens: f64, per_second: f64) -> u64 {
    if per_second <= 0.0 {
        return u64::MAX;
    }
    let secs = ((1.0 - tokens) / per_second).ceil();
    (secs as u64).max(1)
}
