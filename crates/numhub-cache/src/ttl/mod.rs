//! Read-through TTL caching

mod ttl_cache;

pub use ttl_cache::TtlCache;
