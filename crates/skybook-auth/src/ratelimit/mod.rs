//! Token-bucket admission control for the authentication endpoints.
//!
//! Two interchangeable backings sit behind [`RateLimiter`]:
//! - an in-process map of buckets (single node)
//! - Redis with a Lua script (shared budget across nodes)
//!
//! The backing is chosen once at startup by [`build_rate_limiter`].

pub mod bucket;
pub mod limiter;
pub mod memory;
#[cfg(feature = "redis-limiter")]
pub mod redis;

pub use bucket::{Admission, TokenBucket};
pub use limiter::{EndpointGroup, RateLimiter, build_rate_limiter};
pub use memory::LocalRateLimiter;
