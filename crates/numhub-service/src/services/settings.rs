//! Settings service
//!
//! Key/value settings read through the TTL cache. A missing row is cached
//! too (`None`), so absent keys do not hammer the store. Writers update
//! the row and invalidate the cached key before returning success.

use tracing::{info, instrument};

use super::context::{CacheSet, ServiceContext};
use super::error::ServiceResult;

/// Well-known setting keys
pub mod keys {
    pub const ACTIVATION_CHANNEL: &str = "activation_channel";
    pub const PROOF_CHANNEL: &str = "proof_channel";
    pub const NUMBERS_CHANNEL: &str = "numbers_channel";
    pub const DAILY_BONUS_POINTS: &str = "daily_bonus_points";
    pub const INVITE_POINTS: &str = "invite_points";
    pub const PROOF_POINTS: &str = "proof_points";
    pub const PRO_DAYS_DURATION: &str = "pro_days_duration";
    pub const PRO_POINTS_COST: &str = "pro_points_cost";
    pub const MAX_NUMBERS_PER_COUNTRY: &str = "max_numbers_per_country";
    pub const AUTO_CLEANUP_DAYS: &str = "auto_cleanup_days";
    pub const PREMIUM_NUMBER_BONUS: &str = "premium_number_bonus";
    pub const WELCOME_MESSAGE: &str = "welcome_message";
    pub const BROADCAST_INTERVAL: &str = "broadcast_interval";
    pub const RATE_LIMIT_REQUESTS: &str = "rate_limit_requests";
    pub const RATE_LIMIT_WINDOW: &str = "rate_limit_window";
}

/// Defaults seeded once at bootstrap; existing rows win
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    (keys::ACTIVATION_CHANNEL, ""),
    (keys::PROOF_CHANNEL, ""),
    (keys::NUMBERS_CHANNEL, ""),
    (keys::DAILY_BONUS_POINTS, "10"),
    (keys::INVITE_POINTS, "5"),
    (keys::PROOF_POINTS, "3"),
    (keys::PRO_DAYS_DURATION, "30"),
    (keys::PRO_POINTS_COST, "100"),
    (keys::MAX_NUMBERS_PER_COUNTRY, "1000"),
    (keys::AUTO_CLEANUP_DAYS, "30"),
    (keys::PREMIUM_NUMBER_BONUS, "2"),
    (keys::WELCOME_MESSAGE, "1"),
    (keys::BROADCAST_INTERVAL, "24"),
    (keys::RATE_LIMIT_REQUESTS, "5"),
    (keys::RATE_LIMIT_WINDOW, "10"),
];

/// Settings service
pub struct SettingsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SettingsService<'a> {
    /// Create a new SettingsService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Read one key through the cache
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        let repo = self.ctx.settings_repo();
        let value = self
            .ctx
            .caches()
            .settings
            .get_with(key.to_string(), CacheSet::SETTINGS_TTL, || repo.get(key))
            .await?;
        Ok(value)
    }

    /// Read one key, falling back to `default` when the row is absent
    pub async fn get_or(&self, key: &str, default: &str) -> ServiceResult<String> {
        Ok(self.get(key).await?.unwrap_or_else(|| default.to_string()))
    }

    /// Read an integer-valued setting; unparseable or missing values read
    /// as `default`
    pub async fn int(&self, key: &str, default: i64) -> ServiceResult<i64> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default))
    }

    /// Write one key and drop it from the cache before reporting success
    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: &str) -> ServiceResult<()> {
        self.ctx.settings_repo().set(key, value).await?;
        self.ctx.caches().invalidate_setting(key);
        info!(key, "Setting updated");
        Ok(())
    }

    /// Seed the default rows without overwriting operator changes
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> ServiceResult<()> {
        self.ctx.settings_repo().seed_defaults(DEFAULT_SETTINGS).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;

    #[tokio::test(start_paused = true)]
    async fn test_get_with_default() {
        let (ctx, store, _) = test_context();
        let settings = SettingsService::new(&ctx);

        assert_eq!(
            settings.get_or("missing_key", "fallback").await.unwrap(),
            "fallback"
        );

        store.put_setting("daily_bonus_points", "25");
        assert_eq!(settings.int(keys::DAILY_BONUS_POINTS, 10).await.unwrap(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_read_skips_store() {
        let (ctx, store, _) = test_context();
        let settings = SettingsService::new(&ctx);

        store.put_setting("invite_points", "5");
        assert_eq!(settings.int(keys::INVITE_POINTS, 0).await.unwrap(), 5);

        // A direct store change is invisible until the TTL lapses or the
        // key is invalidated
        store.put_setting("invite_points", "9");
        assert_eq!(settings.int(keys::INVITE_POINTS, 0).await.unwrap(), 5);

        ctx.caches().invalidate_setting(keys::INVITE_POINTS);
        assert_eq!(settings.int(keys::INVITE_POINTS, 0).await.unwrap(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_invalidates_cache() {
        let (ctx, store, _) = test_context();
        let settings = SettingsService::new(&ctx);

        store.put_setting("pro_points_cost", "100");
        assert_eq!(settings.int(keys::PRO_POINTS_COST, 0).await.unwrap(), 100);

        settings.set(keys::PRO_POINTS_COST, "150").await.unwrap();
        assert_eq!(settings.int(keys::PRO_POINTS_COST, 0).await.unwrap(), 150);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_defaults_does_not_overwrite() {
        let (ctx, store, _) = test_context();
        let settings = SettingsService::new(&ctx);

        store.put_setting("daily_bonus_points", "42");
        settings.seed_defaults().await.unwrap();

        assert_eq!(settings.int(keys::DAILY_BONUS_POINTS, 0).await.unwrap(), 42);
        assert_eq!(settings.int(keys::PRO_POINTS_COST, 0).await.unwrap(), 100);
    }
}
