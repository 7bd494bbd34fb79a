//! Pool for the PostgreSQL credential store.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use skybook_core::config::DatabaseConfig;
use skybook_core::error::{AppError, ErrorKind};

/// Shared connection pool behind `PgCredentialStore`.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Opens the pool from the `database` config section. Without a URL
    /// there is nothing to connect to, which is a configuration error.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("database.url is not set"))?;

        info!(
            url = %mask_password(url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Opening credential store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Credential store unreachable: {e}"),
                    e,
                )
            })?;

        info!("Credential store pool ready");
        Ok(Self { pool })
    }

    /// The sqlx pool, for repositories and migrations.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips `SELECT 1`; used once at startup before serving.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Credential store did not answer", e)
            })
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Credential store pool closed");
    }
}

/// The URL with any password replaced, for log output.
fn mask_password(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("", url));
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) if !scheme.is_empty() => format!("{scheme}://{user}:****@{host}"),
        Some((user, _)) => format!("{user}:****@{host}"),
        None => url.to_string(),
    }
}
