//! Sliding-window rate limiting

mod rate_limiter;

pub use rate_limiter::RateLimiter;
