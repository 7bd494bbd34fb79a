//! PostgreSQL repository implementations.

pub mod password_history;
pub mod refresh_token;
pub mod role;
pub mod user;

pub use password_history::PasswordHistoryRepository;
pub use refresh_token::RefreshTokenRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use skybook_core::error::{AppError, ErrorKind};

/// Map an insert error, turning unique violations into `Conflict`.
pub(crate) fn map_insert_error(e: sqlx::Error, conflict: &str, context: &str) -> AppError {
    let unique = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        AppError::with_source(ErrorKind::Conflict, conflict, e)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), e)
    }
}
