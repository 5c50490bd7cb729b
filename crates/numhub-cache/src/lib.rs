//! # numhub-cache
//!
//! Process-local shared mutable state, synchronized for concurrent access:
//!
//! - [`TtlCache`]: generic single-flight read-through cache
//! - [`RateLimiter`]: per-user sliding-window admission control
//! - [`SessionStore`]: ephemeral per-user session state with expiry
//!
//! Everything here is in-memory by design; a process restart resets it.
//! Durable state lives behind the repository traits in `numhub-core`.

pub mod limiter;
pub mod session;
pub mod ttl;

pub use limiter::RateLimiter;
pub use session::SessionStore;
pub use ttl::TtlCache;
