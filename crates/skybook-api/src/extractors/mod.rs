//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;

pub use auth::AuthUser;
pub use client::{ClientContext, peer_ip};
pub use json::ValidatedJson;
