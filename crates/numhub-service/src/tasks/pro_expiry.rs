//! PRO expiry sweeper
//!
//! Coarse periodic reconciliation for invariant (c): users whose stored
//! expiry has passed but whose flag is still set get revoked. The lazy
//! check in `LedgerService::is_pro` covers the gap between sweeps; both
//! paths funnel through the same revocation.

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use numhub_common::config::SweeperConfig;

use crate::services::{LedgerService, ServiceContext, ServiceResult};

use super::runner::spawn_periodic;

/// Spawn the PRO expiry sweeper
pub fn spawn(
    ctx: ServiceContext,
    config: &SweeperConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic(
        "pro_expiry",
        config.pro_expiry_interval,
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

/// One reconciliation pass; returns how many users were demoted
pub(crate) async fn sweep_once(ctx: &ServiceContext) -> ServiceResult<usize> {
    let expired = ctx.ledger_repo().expired_pro_users(Utc::now()).await?;
    let count = expired.len();

    let ledger = LedgerService::new(ctx);
    for user in expired {
        ledger.revoke_pro(user).await?;
    }

    if count > 0 {
        info!(count, "Expired PRO subscriptions revoked");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use chrono::Duration;
    use numhub_core::UserId;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_demotes_expired_users_only() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);

        let expired = UserId::new(1);
        let current = UserId::new(2);
        store.put_user(expired);
        store.put_user(current);
        store.expire_pro(expired, Duration::days(2));
        store.make_pro(current);

        assert_eq!(sweep_once(&ctx).await.unwrap(), 1);

        assert!(!store.user(expired).is_pro);
        assert!(store.user(current).is_pro);

        // Sweeper and lazy read agree
        assert!(!ledger.is_pro(expired).await.unwrap());
        assert!(ledger.is_pro(current).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_on_clean_state_is_noop() {
        let (ctx, store, _) = test_context();
        store.put_user(UserId::new(1));

        assert_eq!(sweep_once(&ctx).await.unwrap(), 0);
    }
}
