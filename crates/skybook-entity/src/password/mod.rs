//! Password history entities.

pub mod history;

pub use history::PasswordHistoryEntry;
