//! Generic single-flight TTL cache
//!
//! Each entry is valid for a fixed duration after being populated. A read
//! past the TTL triggers exactly one refresh per key, no matter how many
//! callers miss concurrently: the first caller runs the loader under a
//! per-key lock while the rest wait and then reuse its result. Loader
//! failures propagate to the caller and are never cached, so a stale entry
//! is never served past its TTL.

use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    cached_at: Instant,
}

/// Concurrent read-through cache with per-key single-flight refresh
pub struct TtlCache<K, V> {
    entries: DashMap<K, CachedEntry<V>>,
    refresh_locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            refresh_locks: DashMap::new(),
        }
    }

    /// Return the cached value if it is younger than `ttl`
    pub fn get_fresh(&self, key: &K, ttl: Duration) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.cached_at.elapsed() <= ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Get the cached value, refreshing through `loader` on a miss or an
    /// expired entry.
    ///
    /// Concurrent misses for the same key collapse to one loader call.
    /// A loader error is returned as-is and nothing is cached.
    pub async fn get_with<F, Fut, E>(&self, key: K, ttl: Duration, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(&key, ttl) {
            return Ok(value);
        }

        // The shard guard must not be held across an await; clone the Arc
        // out in its own statement.
        let lock = self
            .refresh_locks
            .entry(key.clone())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        // A caller that held the lock before us may have refreshed already
        if let Some(value) = self.get_fresh(&key, ttl) {
            return Ok(value);
        }

        let value = loader().await?;
        self.entries.insert(
            key,
            CachedEntry {
                value: value.clone(),
                cached_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Store a value directly, stamping it as fresh
    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CachedEntry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop one entry; the next read refreshes
    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
        self.refresh_locks.remove(key);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
        self.refresh_locks.clear();
    }

    /// Evict entries older than `ttl`; returns how many were removed
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.cached_at.elapsed() <= ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit() {
        let cache: TtlCache<&str, i32> = TtlCache::new();
        let loads = AtomicUsize::new(0);

        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(7)
        };

        assert_eq!(cache.get_with("k", TTL, load).await.unwrap(), 7);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        // Fresh entry served without reloading
        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(8)
        };
        assert_eq!(cache.get_with("k", TTL, load).await.unwrap(), 7);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_expiry() {
        let cache: TtlCache<&str, i32> = TtlCache::new();
        cache.insert("k", 1);

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(cache.get_fresh(&"k", TTL), None);

        let value = cache
            .get_with("k", TTL, || async { Ok::<_, Infallible>(2) })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(cache.get_fresh(&"k", TTL), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_load_once() {
        let cache: Arc<TtlCache<&'static str, i32>> = Arc::new(TtlCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                cache
                    .get_with("k", TTL, || async {
                        loads.fetch_add(1, Ordering::SeqCst);
                        // Keep the refresh in flight so every task misses
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok::<_, Infallible>(42)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_error_not_cached() {
        let cache: TtlCache<&str, i32> = TtlCache::new();

        let result = cache
            .get_with("k", TTL, || async { Err::<i32, _>("store down") })
            .await;
        assert_eq!(result, Err("store down"));
        assert!(cache.is_empty());

        // Next read retries the loader
        let value = cache
            .get_with("k", TTL, || async { Ok::<_, &str>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_and_purge() {
        let cache: TtlCache<&str, i32> = TtlCache::new();
        cache.insert("a", 1);
        cache.insert("b", 2);

        cache.invalidate(&"a");
        assert_eq!(cache.get_fresh(&"a", TTL), None);
        assert_eq!(cache.get_fresh(&"b", TTL), Some(2));

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(cache.purge_expired(TTL), 1);
        assert!(cache.is_empty());
    }
}
