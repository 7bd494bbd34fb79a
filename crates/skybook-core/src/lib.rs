//! # skybook-core
//!
//! Core crate for the SkyBook backend. Contains configuration schemas,
//! the injectable clock, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SkyBook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use traits::{Clock, ManualClock, SystemClock};
