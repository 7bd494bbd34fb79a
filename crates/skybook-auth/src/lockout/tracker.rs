//! Failed-attempt counting and timed account locks.
//!
//! State lives on the user row. A lock whose instant has passed is treated
//! as open on the next check; nothing sweeps expired locks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use skybook_core::error::AppError;
use skybook_core::traits::Clock;
use skybook_database::CredentialStore;
use skybook_entity::user::User;

/// Lockout state of an account after a failure was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    /// Login is still possible.
    Open {
        /// Consecutive failures so far.
        failed_attempts: i32,
    },
    /// Login is refused until the instant passes.
    Locked {
        /// Unlock instant.
        until: DateTime<Utc>,
    },
}

/// Applies the lockout state machine through the credential store.
#[derive(Debug, Clone)]
pub struct LockoutTracker {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    max_attempts: i32,
    lock_duration: Duration,
}

impl LockoutTracker {
    /// Creates a tracker locking for `lock_minutes` after `max_attempts` failures.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        max_attempts: i32,
        lock_minutes: i64,
    ) -> Self {
        Self {
            store,
            clock,
            max_attempts: max_attempts.max(1),
            lock_duration: Duration::minutes(lock_minutes.max(1)),
        }
    }

    /// Fails with `AccountLocked` while the user's lock is in the future.
    pub fn check(&self, user: &User) -> Result<(), AppError> {
        let now = self.clock.now();
        match user.lock_until {
            Some(until) if user.is_locked_at(now) => Err(locked(now, until)),
            _ => Ok(()),
        }
    }

    /// Records one failed attempt atomically and reports the new state.
    ///
    /// `user` may be stale. When the stored lock was already active the
    /// attempt is not counted and fails with `AccountLocked`.
    pub async fn record_failure(&self, user: &User) -> Result<LockoutState, AppError> {
        let now = self.clock.now();
        let outcome = self
            .store
            .record_failed_login(user.id, now, self.max_attempts, now + self.lock_duration)
            .await?;

        if outcome.already_locked {
            let until = outcome.lock_until.unwrap_or(now);
            warn!(user_id = %user.id, locked_until = %until, "Failed login while account locked");
            return Err(locked(now, until));
        }

        match outcome.lock_until {
            Some(until) if now < until => {
                warn!(
                    user_id = %user.id,
                    attempts = outcome.attempts,
                    locked_until = %until,
                    "Account locked after repeated failed logins"
                );
                Ok(LockoutState::Locked { until })
            }
            _ => {
                warn!(
                    user_id = %user.id,
                    attempts = outcome.attempts,
                    max_attempts = self.max_attempts,
                    "Failed login attempt"
                );
                Ok(LockoutState::Open {
                    failed_attempts: outcome.attempts,
                })
            }
        }
    }

    /// Clears the counter and lock, and stamps the login time.
    ///
    /// A lock set by a concurrent attempt after `user` was read is not
    /// cleared; the login fails with `AccountLocked` instead.
    pub async fn record_success(&self, user: &User) -> Result<(), AppError> {
        let now = self.clock.now();
        if self.store.reset_login_state(user.id, now).await? {
            return Ok(());
        }

        let until = self
            .store
            .find_user_by_id(user.id)
            .await?
            .and_then(|u| u.lock_until)
            .unwrap_or(now);
        warn!(user_id = %user.id, locked_until = %until, "Correct password while account locked");
        Err(locked(now, until))
    }
}

fn locked(now: DateTime<Utc>, until: DateTime<Utc>) -> AppError {
    AppError::account_locked(until, seconds_until(now, until))
}

/// Whole seconds from `now` until `until`, rounded up, at least 1.
pub(crate) fn seconds_until(now: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    let millis = (until - now).num_milliseconds();
    u64::try_from(millis).unwrap_or(0).div_ceil(1000).max(1)
}
