//! # skybook-database
//!
//! The credential store boundary consumed by the authentication core, plus
//! two implementations: an in-process store used for tests and single-node
//! development, and a PostgreSQL store built on the repositories in
//! [`repositories`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, FailedLoginOutcome};
