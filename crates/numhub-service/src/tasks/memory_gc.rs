//! In-memory garbage collection
//!
//! Evicts idle rate-limiter windows, expired conversational sessions, and
//! stale user-stat cache entries. Bounds memory growth from one-shot
//! users; durable state is untouched.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use numhub_common::config::SweeperConfig;

use crate::services::{keys, CacheSet, ServiceContext, ServiceResult, SettingsService};

use super::runner::spawn_periodic;

/// Spawn the in-memory GC sweeper
pub fn spawn(
    ctx: ServiceContext,
    config: &SweeperConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic(
        "memory_gc",
        config.memory_gc_interval,
        config.error_backoff,
        shutdown,
        move || {
            let ctx = ctx.clone();
            async move {
                sweep_once(&ctx).await?;
                Ok(())
            }
        },
    )
}

/// One GC pass; returns how many entries were evicted in total
pub(crate) async fn sweep_once(ctx: &ServiceContext) -> ServiceResult<usize> {
    let window = SettingsService::new(ctx)
        .int(keys::RATE_LIMIT_WINDOW, 10)
        .await?;

    let limiter = ctx
        .rate_limiter()
        .sweep(Duration::from_secs(window.max(1) as u64));
    let sessions = ctx.sessions().sweep();
    let stats = ctx.caches().user_stats.purge_expired(CacheSet::USER_STATS_TTL);

    let evicted = limiter + sessions + stats;
    if evicted > 0 {
        debug!(limiter, sessions, stats, "Evicted idle in-memory entries");
    }
    Ok(evicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use crate::services::{SessionService, ThrottleService, UserFlow};
    use numhub_core::{CountryId, UserId};

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_idle_entries() {
        let (ctx, _, _) = test_context();

        ThrottleService::new(&ctx).check(UserId::new(1)).await.unwrap();
        SessionService::new(&ctx).begin(
            UserId::new(2),
            UserFlow::AwaitingPattern {
                country_id: CountryId::new(1),
            },
        );

        // Nothing is idle yet
        assert_eq!(sweep_once(&ctx).await.unwrap(), 0);
        assert_eq!(ctx.rate_limiter().tracked_users(), 1);
        assert_eq!(ctx.sessions().len(), 1);

        // Rate window idles out after 2x the window; the session after an
        // hour
        tokio::time::advance(Duration::from_secs(3601)).await;
        assert_eq!(sweep_once(&ctx).await.unwrap(), 2);
        assert_eq!(ctx.rate_limiter().tracked_users(), 0);
        assert_eq!(ctx.sessions().len(), 0);
    }
}
