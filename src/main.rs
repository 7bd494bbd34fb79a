//! SkyBook Server: authentication and session core.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use skybook_api::{AppState, build_router};
use skybook_auth::{AuthService, build_rate_limiter};
use skybook_core::config::AppConfig;
use skybook_core::error::AppError;
use skybook_core::traits::{Clock, SystemClock};
use skybook_database::{CredentialStore, DatabasePool, MemoryCredentialStore, PgCredentialStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("SKYBOOK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SkyBook v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Credential store
    let db = if config.database.url.is_some() {
        let db = DatabasePool::connect(&config.database).await?;
        if !db.health_check().await? {
            return Err(AppError::database("Database health check failed"));
        }
        if config.database.run_migrations {
            skybook_database::migration::run_migrations(db.pool()).await?;
        }
        Some(db)
    } else {
        None
    };
    let store: Arc<dyn CredentialStore> = match &db {
        Some(db) => Arc::new(PgCredentialStore::new(db)),
        None => {
            tracing::warn!(
                "database.url is not set; using the in-memory credential store, data is lost on restart"
            );
            Arc::new(MemoryCredentialStore::new())
        }
    };

    // Auth and rate limiting
    let rate_limiter = build_rate_limiter(&config.rate_limit, clock.clone()).await?;
    let auth = AuthService::new(store, &config.auth, clock)?;

    let bind_address = config.server.bind_address();
    let state = AppState::new(config, auth, rate_limiter);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {bind_address}: {e}")))?;
    tracing::info!(address = %bind_address, "SkyBook listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server failed: {e}")))?;

    if let Some(db) = db {
        db.close().await;
    }
    tracing::info!("SkyBook stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
