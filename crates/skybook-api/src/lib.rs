//! # skybook-api
//!
//! HTTP API layer for SkyBook built on Axum.
//!
//! Provides the `/api/auth` endpoints, the bearer-token extractor, rate
//! limiting and request logging middleware, DTOs and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
