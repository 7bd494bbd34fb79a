//! Refresh token entities.

pub mod model;

pub use model::{NewRefreshToken, RefreshTokenRecord};
