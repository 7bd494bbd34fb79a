//! Password hashing, strength policy and reuse prevention.

pub mod hasher;
pub mod history;
pub mod validator;

pub use hasher::PasswordHasher;
pub use history::PasswordHistoryChecker;
pub use validator::PasswordPolicy;
