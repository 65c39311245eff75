//! Per-client request budget.

mod rate_limiter;

pub use rate_limiter::{Admission, Quota, RateLimitConfig, RateLimiter};
