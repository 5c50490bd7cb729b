//! Per-user session store with expiry
//!
//! Holds short-lived conversational state ("awaiting proof", "browsing a
//! country", admin wizard steps) keyed by user id. Entries expire after a
//! fixed idle duration: reads past the deadline see nothing, and the
//! periodic sweep reclaims the memory. One store owns one state type; the
//! service layer defines the state enum.

use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use numhub_core::UserId;

#[derive(Debug, Clone)]
struct SessionEntry<S> {
    state: S,
    touched_at: Instant,
}

/// Concurrent per-user session map with lazy expiry
pub struct SessionStore<S> {
    entries: DashMap<UserId, SessionEntry<S>>,
    ttl: Duration,
}

impl<S: Clone> SessionStore<S> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Store or replace the user's session, stamping it as fresh
    pub fn set(&self, user: UserId, state: S) {
        self.entries.insert(
            user,
            SessionEntry {
                state,
                touched_at: Instant::now(),
            },
        );
    }

    /// Read the user's session. An expired entry is removed and reads as
    /// absent.
    pub fn get(&self, user: UserId) -> Option<S> {
        let expired = {
            let entry = self.entries.get(&user)?;
            if entry.touched_at.elapsed() <= self.ttl {
                return Some(entry.state.clone());
            }
            true
        };
        if expired {
            self.entries.remove(&user);
        }
        None
    }

    /// Refresh the expiry clock without changing the state; returns false
    /// for a missing or expired session
    pub fn touch(&self, user: UserId) -> bool {
        match self.entries.get_mut(&user) {
            Some(mut entry) if entry.touched_at.elapsed() <= self.ttl => {
                entry.touched_at = Instant::now();
                true
            }
            _ => false,
        }
    }

    /// Remove the user's session; returns whether one existed
    pub fn clear(&self, user: UserId) -> bool {
        self.entries.remove(&user).is_some()
    }

    /// Evict every expired entry; returns how many were removed
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.touched_at.elapsed() <= self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn test_set_get_clear() {
        let store: SessionStore<String> = SessionStore::new(TTL);
        let user = UserId::new(1);

        assert_eq!(store.get(user), None);
        store.set(user, "browsing".to_string());
        assert_eq!(store.get(user), Some("browsing".to_string()));
        assert!(store.clear(user));
        assert!(!store.clear(user));
        assert_eq!(store.get(user), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_reads_as_absent() {
        let store: SessionStore<u32> = SessionStore::new(TTL);
        let user = UserId::new(1);

        store.set(user, 1);
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(store.get(user), None);
        // Lazy removal actually dropped the entry
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_extends_lifetime() {
        let store: SessionStore<u32> = SessionStore::new(TTL);
        let user = UserId::new(1);

        store.set(user, 1);
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(store.touch(user));
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert_eq!(store.get(user), Some(1));

        tokio::time::advance(TTL).await;
        assert!(!store.touch(user));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep() {
        let store: SessionStore<u32> = SessionStore::new(TTL);
        store.set(UserId::new(1), 1);
        tokio::time::advance(TTL / 2).await;
        store.set(UserId::new(2), 2);

        tokio::time::advance(TTL / 2 + Duration::from_secs(1)).await;
        assert_eq!(store.sweep(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(UserId::new(2)), Some(2));
    }
}
