//! Convenience result type alias for SkyBook.

use crate::error::AppError;

/// A specialized `Result` type for SkyBook operations.
pub type AppResult<T> = Result<T, AppError>;
