//! # skybook-entity
//!
//! Domain entity models for the SkyBook authentication core. Every struct in
//! this crate represents a database table row or a domain value object.
//! Database entities additionally derive `sqlx::FromRow`.

pub mod password;
pub mod token;
pub mod user;
