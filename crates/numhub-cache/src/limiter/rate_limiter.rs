//! Per-user sliding-window rate limiter
//!
//! Each user carries an ordered window of request timestamps. Timestamps
//! are pruned lazily on every check; idle users are evicted wholesale by
//! the periodic sweep. Nothing is persisted - a restart resets all limits,
//! which is acceptable for a soft abuse control.

use dashmap::DashMap;
use std::collections::VecDeque;
use tokio::time::{Duration, Instant};

use numhub_core::UserId;

/// Sliding-window admission control, one window per user
pub struct RateLimiter {
    windows: DashMap<UserId, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Admit or deny one request.
    ///
    /// Drops timestamps older than `window`, denies when `max_requests`
    /// remain, otherwise records the request and admits it. Window and
    /// limit come from the caller so they can follow live settings.
    pub fn check(&self, user: UserId, window: Duration, max_requests: usize) -> bool {
        let now = Instant::now();
        let mut timestamps = self.windows.entry(user).or_default();

        while timestamps
            .front()
            .is_some_and(|t| now.duration_since(*t) > window)
        {
            timestamps.pop_front();
        }

        if timestamps.len() >= max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Evict users whose window is empty or whose last request is older
    /// than `2 * window`; returns how many users were removed.
    ///
    /// Bounds memory growth from one-shot or abandoned users.
    pub fn sweep(&self, window: Duration) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|t| now.duration_since(*t) <= window * 2)
        });
        before - self.windows.len()
    }

    /// Number of users currently tracked
    pub fn tracked_users(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn test_allows_up_to_max() {
        let limiter = RateLimiter::new();
        let user = UserId::new(1);

        for _ in 0..5 {
            assert!(limiter.check(user, WINDOW, 5));
        }
        assert!(!limiter.check(user, WINDOW, 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let limiter = RateLimiter::new();
        let user = UserId::new(1);

        assert!(limiter.check(user, WINDOW, 2));
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(limiter.check(user, WINDOW, 2));
        assert!(!limiter.check(user, WINDOW, 2));

        // First timestamp falls out of the window; one slot frees up
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(limiter.check(user, WINDOW, 2));
        assert!(!limiter.check(user, WINDOW, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_are_independent() {
        let limiter = RateLimiter::new();

        assert!(limiter.check(UserId::new(1), WINDOW, 1));
        assert!(!limiter.check(UserId::new(1), WINDOW, 1));
        assert!(limiter.check(UserId::new(2), WINDOW, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_idle_users() {
        let limiter = RateLimiter::new();
        limiter.check(UserId::new(1), WINDOW, 5);
        limiter.check(UserId::new(2), WINDOW, 5);
        assert_eq!(limiter.tracked_users(), 2);

        tokio::time::advance(Duration::from_secs(15)).await;
        limiter.check(UserId::new(2), WINDOW, 5);

        // User 1 idle past 2x window, user 2 active
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(limiter.sweep(WINDOW), 1);
        assert_eq!(limiter.tracked_users(), 1);
    }
}
