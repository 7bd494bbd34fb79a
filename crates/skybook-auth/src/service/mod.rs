//! Authentication orchestration.

pub mod auth;

pub use auth::AuthService;
