//! Embedded schema for the credential tables.

use sqlx::PgPool;
use tracing::info;

use skybook_core::error::{AppError, ErrorKind};

/// Bring the credential schema up to date. Already applied versions are
/// skipped, so this is safe on every start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(
        available = migrator.iter().count(),
        "Applying credential schema migrations"
    );

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Credential schema migration failed: {e}"),
            e,
        )
    })?;

    info!("Credential schema is current");
    Ok(())
}
