//! Retention purge
//!
//! Deletes proofs, audit entries, and points-history rows older than the
//! configured `auto_cleanup_days`, in its own transaction and on its own
//! schedule. The cutoff is computed here and bound as a parameter; a
//! non-positive setting disables the purge.

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use numhub_common::config::SweeperConfig;
use numhub_core::entities::PurgeCounts;

use crate::services::{keys, ServiceContext, ServiceResult, SettingsService};

use super::runner::spawn_periodic;

/// Spawn the retention purge sweeper
pub fn spawn(
    ctx: ServiceContext,
    config: &SweeperConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_periodic(
        "retention_purge",
        config.retention_interval,
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

/// One purge pass
pub(crate) async fn sweep_once(ctx: &ServiceContext) -> ServiceResult<PurgeCounts> {
    let days = SettingsService::new(ctx)
        .int(keys::AUTO_CLEANUP_DAYS, 30)
        .await?;

    if days <= 0 {
        return Ok(PurgeCounts::default());
    }

    let cutoff = Utc::now() - Duration::days(days);
    let counts = ctx.maintenance_repo().purge_history(cutoff).await?;

    if counts.total() > 0 {
        info!(
            proofs = counts.proofs,
            audit = counts.audit_entries,
            points = counts.points_entries,
            "Purged historical rows"
        );
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use crate::services::{LedgerService, ProofService};
    use numhub_core::entities::reasons;
    use numhub_core::UserId;

    #[tokio::test(start_paused = true)]
    async fn test_purge_removes_only_old_rows() {
        let (ctx, store, _) = test_context();
        let user = UserId::new(1);
        store.put_user(user);

        LedgerService::new(&ctx)
            .add_points(user, 5, reasons::ADMIN_ADJUST)
            .await
            .unwrap();
        ProofService::new(&ctx)
            .submit(user, "+4912345", None, "Testland", "CODE1")
            .await
            .unwrap();

        // Everything is fresh: nothing to purge
        let counts = sweep_once(&ctx).await.unwrap();
        assert_eq!(counts.total(), 0);

        // Age all history past the 30-day default window
        store.age_all_history(40);
        let counts = sweep_once(&ctx).await.unwrap();
        assert!(counts.points_entries >= 1);
        assert_eq!(counts.proofs, 1);
        assert_eq!(store.proof_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retention_disables_purge() {
        let (ctx, store, _) = test_context();
        let user = UserId::new(1);
        store.put_user(user);
        store.put_setting(keys::AUTO_CLEANUP_DAYS, "0");

        LedgerService::new(&ctx)
            .add_points(user, 5, reasons::ADMIN_ADJUST)
            .await
            .unwrap();
        store.age_all_history(400);

        let counts = sweep_once(&ctx).await.unwrap();
        assert_eq!(counts.total(), 0);
        assert!(store.history_sum(user) == 5);
    }
}
