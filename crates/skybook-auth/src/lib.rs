//! # skybook-auth
//!
//! Authentication and session lifecycle management for SkyBook.
//!
//! ## Modules
//!
//! - `jwt`: access token signing and validation
//! - `password`: Argon2id hashing, strength policy, reuse prevention
//! - `refresh`: opaque refresh tokens with single-use rotation
//! - `lockout`: failed-attempt counting and timed locks
//! - `ratelimit`: token-bucket admission control (local or Redis)
//! - `service`: the orchestrator composing all of the above

pub mod jwt;
pub mod lockout;
pub mod password;
pub mod ratelimit;
pub mod refresh;
pub mod service;
pub mod types;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use lockout::{LockoutState, LockoutTracker};
pub use password::{PasswordHasher, PasswordHistoryChecker, PasswordPolicy};
pub use ratelimit::{Admission, EndpointGroup, RateLimiter, build_rate_limiter};
pub use refresh::RefreshTokenManager;
pub use service::AuthService;
pub use types::{AuthResult, ClientMeta, Registration, SessionSummary};
