//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use skybook_auth::{AuthService, RateLimiter};
use skybook_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Authentication orchestrator
    pub auth: AuthService,
    /// Rate limiter (local or Redis)
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Process start, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state from already constructed services.
    pub fn new(config: AppConfig, auth: AuthService, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            config: Arc::new(config),
            auth,
            rate_limiter,
            started_at: Instant::now(),
        }
    }
}
