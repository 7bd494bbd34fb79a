//! Opaque refresh tokens: generation, hashing, storage, rotation and revocation.

pub mod manager;
pub mod token;

pub use manager::{MintedRefreshToken, RefreshTokenManager};
pub use token::{generate_refresh_token, hash_refresh_token};
