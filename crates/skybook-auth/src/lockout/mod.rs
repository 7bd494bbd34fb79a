//! Per-account brute-force lockout.

pub mod tracker;

pub use tracker::{LockoutState, LockoutTracker};
