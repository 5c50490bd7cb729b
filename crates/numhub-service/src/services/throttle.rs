//! Per-user request throttling
//!
//! Bridges the in-memory sliding-window limiter with the live
//! `rate_limit_window` / `rate_limit_requests` settings, which are read
//! through the settings cache.

use std::time::Duration;

use tracing::instrument;

use numhub_core::value_objects::UserId;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::settings::{keys, SettingsService};

/// Throttle service
pub struct ThrottleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ThrottleService<'a> {
    /// Create a new ThrottleService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Admit or reject one request for `user`
    #[instrument(skip(self))]
    pub async fn check(&self, user: UserId) -> ServiceResult<()> {
        let settings = SettingsService::new(self.ctx);
        let window = settings.int(keys::RATE_LIMIT_WINDOW, 10).await?;
        let max_requests = settings.int(keys::RATE_LIMIT_REQUESTS, 5).await?;

        let window = Duration::from_secs(window.max(1) as u64);
        let allowed = self
            .ctx
            .rate_limiter()
            .check(user, window, max_requests.max(0) as usize);

        if allowed {
            Ok(())
        } else {
            Err(ServiceError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;

    #[tokio::test(start_paused = true)]
    async fn test_denies_past_configured_limit() {
        let (ctx, store, _) = test_context();
        store.put_setting(keys::RATE_LIMIT_REQUESTS, "2");
        store.put_setting(keys::RATE_LIMIT_WINDOW, "10");

        let throttle = ThrottleService::new(&ctx);
        let user = UserId::new(1);

        assert!(throttle.check(user).await.is_ok());
        assert!(throttle.check(user).await.is_ok());
        assert!(matches!(
            throttle.check(user).await,
            Err(ServiceError::RateLimited)
        ));

        // Another user is unaffected
        assert!(throttle.check(UserId::new(2)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_frees_up_over_time() {
        let (ctx, store, _) = test_context();
        store.put_setting(keys::RATE_LIMIT_REQUESTS, "1");
        store.put_setting(keys::RATE_LIMIT_WINDOW, "10");

        let throttle = ThrottleService::new(&ctx);
        let user = UserId::new(1);

        assert!(throttle.check(user).await.is_ok());
        assert!(throttle.check(user).await.is_err());

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(throttle.check(user).await.is_ok());
    }
}
