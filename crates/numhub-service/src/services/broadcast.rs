//! Broadcast engine
//!
//! Fans an advertisement out to a resolved audience snapshot. The
//! persisted run descriptor is the single source of truth: the worker
//! re-reads it before every send so cancellation lands within one
//! send-plus-persist cycle, counters and cursor are persisted after every
//! attempt so a crash loses at most the in-flight message, and terminal
//! transitions are guarded so a run only ever moves forward.

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use numhub_core::entities::{
    Advertisement, BroadcastReport, BroadcastRun, BroadcastStatus, NewAdvertisement,
};
use numhub_core::traits::ChatTarget;
use numhub_core::value_objects::{AdId, AudienceFilter, UserId};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Broadcast service
pub struct BroadcastService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BroadcastService<'a> {
    /// Create a new BroadcastService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start a run: resolve the audience snapshot, persist the descriptor,
    /// and launch the worker. Returns the run id.
    ///
    /// `audience` overrides the advertisement's stored default filter.
    #[instrument(skip(self))]
    pub async fn start(
        &self,
        ad_id: AdId,
        audience: Option<AudienceFilter>,
    ) -> ServiceResult<String> {
        let ad = self
            .ctx
            .ad_repo()
            .find_by_id(ad_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Advertisement", ad_id.to_string()))?;

        if !ad.is_active {
            return Err(ServiceError::validation("advertisement is not active"));
        }

        let filter = audience.unwrap_or(ad.target_audience);
        let targets = self.ctx.user_repo().audience(filter, None).await?;

        let run = BroadcastRun::new(Uuid::new_v4().simple().to_string(), ad_id, targets.len() as i64);
        let run_id = run.run_id.clone();
        self.ctx.broadcast_repo().create(&run).await?;

        info!(run_id = %run_id, ad_id = %ad_id, targets = targets.len(), %filter, "Broadcast started");

        tokio::spawn(run_worker(self.ctx.clone(), run, ad, targets));

        Ok(run_id)
    }

    /// Request cancellation. Returns whether the running -> stopped
    /// transition happened; a no-op (already terminal or unknown) is not
    /// an error.
    #[instrument(skip(self))]
    pub async fn stop(&self, run_id: &str) -> ServiceResult<bool> {
        let stopped = self.ctx.broadcast_repo().mark_stopped(run_id).await?;
        if stopped {
            info!(run_id, "Broadcast stop requested");
        }
        Ok(stopped)
    }

    /// Progress snapshot joined with the advertisement content
    #[instrument(skip(self))]
    pub async fn progress(&self, run_id: &str) -> ServiceResult<BroadcastReport> {
        let run = self
            .ctx
            .broadcast_repo()
            .find(run_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Broadcast run", run_id))?;

        let ad = self
            .ctx
            .ad_repo()
            .find_by_id(run.ad_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Advertisement", run.ad_id.to_string()))?;

        Ok(BroadcastReport {
            run,
            ad_title: ad.title,
            ad_content: ad.content,
        })
    }

    // === Advertisement management ===

    /// Create an advertisement
    #[instrument(skip(self, ad), fields(title = %ad.title))]
    pub async fn create_ad(&self, ad: &NewAdvertisement) -> ServiceResult<AdId> {
        let id = self.ctx.ad_repo().create(ad).await?;
        info!(ad_id = %id, "Advertisement created");
        Ok(id)
    }

    /// Recent advertisements, newest first
    pub async fn list_ads(
        &self,
        limit: i64,
        active_only: bool,
    ) -> ServiceResult<Vec<Advertisement>> {
        Ok(self.ctx.ad_repo().list(limit, active_only).await?)
    }

    /// Flip an advertisement's active flag; returns the new state
    #[instrument(skip(self))]
    pub async fn toggle_ad(&self, id: AdId) -> ServiceResult<bool> {
        Ok(self.ctx.ad_repo().toggle_active(id).await?)
    }

    /// Delete an advertisement. Past runs keep their progress rows.
    #[instrument(skip(self))]
    pub async fn delete_ad(&self, id: AdId) -> ServiceResult<()> {
        Ok(self.ctx.ad_repo().delete(id).await?)
    }

    /// Relaunch workers for runs left `running` by a previous process.
    ///
    /// The audience is re-resolved with the run's filter above the
    /// persisted cursor; already-processed targets are not revisited.
    /// Returns how many runs were resumed.
    #[instrument(skip(self))]
    pub async fn resume_interrupted(&self) -> ServiceResult<usize> {
        let runs = self.ctx.broadcast_repo().running().await?;
        let mut resumed = 0;

        for run in runs {
            let Some(ad) = self.ctx.ad_repo().find_by_id(run.ad_id).await? else {
                warn!(run_id = %run.run_id, ad_id = %run.ad_id,
                      "Advertisement gone; stopping orphaned run");
                self.ctx.broadcast_repo().mark_stopped(&run.run_id).await?;
                continue;
            };

            let targets = self
                .ctx
                .user_repo()
                .audience(ad.target_audience, run.cursor)
                .await?;

            info!(run_id = %run.run_id, remaining = targets.len(), "Resuming interrupted broadcast");
            tokio::spawn(run_worker(self.ctx.clone(), run, ad, targets));
            resumed += 1;
        }

        Ok(resumed)
    }
}

/// The delivery loop for one run. Processes targets in ascending-id order;
/// every attempt persists counters and cursor before pacing.
async fn run_worker(
    ctx: ServiceContext,
    run: BroadcastRun,
    ad: Advertisement,
    targets: Vec<UserId>,
) {
    let run_id = run.run_id.as_str();
    let text = ad.render();
    let mut sent = run.sent_count;
    let mut failed = run.failed_count;

    for target in targets {
        // Cooperative cancellation: re-read the persisted status before
        // each send. Remaining targets are not marked failed.
        match ctx.broadcast_repo().status(run_id).await {
            Ok(Some(BroadcastStatus::Running)) => {}
            Ok(_) => {
                info!(run_id, sent, failed, "Broadcast no longer running; worker exiting");
                return;
            }
            Err(e) => {
                error!(run_id, error = %e, "Status check failed; worker exiting");
                return;
            }
        }

        let failure = match ctx
            .gateway()
            .send_message(&ChatTarget::User(target), &text)
            .await
        {
            Ok(_) => {
                sent += 1;
                None
            }
            Err(e) => {
                failed += 1;
                Some(format!("{target}: {e}"))
            }
        };

        if let Err(e) = ctx
            .broadcast_repo()
            .record_attempt(run_id, target, sent, failed, failure.as_deref())
            .await
        {
            error!(run_id, error = %e, "Progress persist failed; worker exiting");
            return;
        }

        tokio::time::sleep(ctx.broadcast_send_delay()).await;
    }

    // Audience exhausted without a stop request
    match ctx.broadcast_repo().mark_completed(run_id).await {
        Ok(true) => {
            if let Err(e) = ctx.ad_repo().record_sent(ad.id, sent).await {
                warn!(run_id, error = %e, "Could not update advertisement delivery total");
            }
            info!(run_id, sent, failed, "Broadcast completed");
        }
        Ok(false) => info!(run_id, "Broadcast was stopped at the finish line"),
        Err(e) => error!(run_id, error = %e, "Could not mark broadcast completed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{test_context, FakeGateway, FakeStore};
    use std::sync::Arc;
    use std::time::Duration;

    async fn seed_ad(store: &FakeStore) -> AdId {
        store.put_ad(NewAdvertisement {
            title: "Hello".to_string(),
            content: "World".to_string(),
            created_by: UserId::new(999),
            target_audience: AudienceFilter::All,
        })
    }

    async fn wait_for_terminal(ctx: &ServiceContext, run_id: &str) -> BroadcastRun {
        loop {
            let run = ctx.broadcast_repo().find(run_id).await.unwrap().unwrap();
            if run.status.is_terminal() {
                return run;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn wait_for_attempts(ctx: &ServiceContext, run_id: &str, count: i64) {
        loop {
            let run = ctx.broadcast_repo().find(run_id).await.unwrap().unwrap();
            if run.attempted() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_completes_with_counts() {
        let (ctx, store, gateway) = test_context();
        for id in 1..=5 {
            store.put_user(UserId::new(id));
        }
        let ad_id = seed_ad(&store).await;

        let run_id = BroadcastService::new(&ctx).start(ad_id, None).await.unwrap();
        let run = wait_for_terminal(&ctx, &run_id).await;

        assert_eq!(run.status, BroadcastStatus::Completed);
        assert_eq!(run.total_users, 5);
        assert_eq!(run.sent_count, 5);
        assert_eq!(run.failed_count, 0);
        assert!(run.ended_at.is_some());
        assert_eq!(gateway.sent_count(), 5);

        // Completed runs feed the advertisement's lifetime total
        assert_eq!(store.ad(ad_id).sent_to, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_counted_not_fatal() {
        let (ctx, store, gateway) = test_context();
        for id in 1..=4 {
            store.put_user(UserId::new(id));
        }
        gateway.fail_sends_to(UserId::new(2));
        gateway.fail_sends_to(UserId::new(3));
        let ad_id = seed_ad(&store).await;

        let run_id = BroadcastService::new(&ctx).start(ad_id, None).await.unwrap();
        let run = wait_for_terminal(&ctx, &run_id).await;

        assert_eq!(run.status, BroadcastStatus::Completed);
        assert_eq!(run.sent_count, 2);
        assert_eq!(run.failed_count, 2);
        assert!(run.errors.contains("2:"));
        assert!(run.errors.contains("3:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_midway_is_terminal_and_bounded() {
        let (ctx, store, gateway) = test_context();
        for id in 1..=50 {
            store.put_user(UserId::new(id));
        }
        let ad_id = seed_ad(&store).await;
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        gateway.gate_sends(Arc::clone(&gate));

        let broadcasts = BroadcastService::new(&ctx);
        let run_id = broadcasts.start(ad_id, None).await.unwrap();

        // Let exactly three sends through, then stop
        gate.add_permits(3);
        wait_for_attempts(&ctx, &run_id, 3).await;
        assert!(broadcasts.stop(&run_id).await.unwrap());

        // Unblock everything; the worker must notice the stop
        gate.add_permits(100);
        let run = wait_for_terminal(&ctx, &run_id).await;

        assert_eq!(run.status, BroadcastStatus::Stopped);
        assert!(run.attempted() <= 4, "attempted {} after stop", run.attempted());
        assert!(run.attempted() >= 3);

        // Stopping again is a no-op, not an error
        assert!(!broadcasts.stop(&run_id).await.unwrap());

        // The stopped run stays queryable for audit
        let report = broadcasts.progress(&run_id).await.unwrap();
        assert_eq!(report.run.status, BroadcastStatus::Stopped);
        assert_eq!(report.ad_title, "Hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_audience_filter_pro_only() {
        let (ctx, store, gateway) = test_context();
        store.put_user(UserId::new(1));
        store.put_user(UserId::new(2));
        store.make_pro(UserId::new(2));
        store.put_user(UserId::new(3));
        store.set_banned(UserId::new(3), true);
        let ad_id = seed_ad(&store).await;

        let run_id = BroadcastService::new(&ctx)
            .start(ad_id, Some(AudienceFilter::Pro))
            .await
            .unwrap();
        let run = wait_for_terminal(&ctx, &run_id).await;

        assert_eq!(run.total_users, 1);
        assert_eq!(gateway.sent_to(), vec![UserId::new(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_banned_users_never_targeted() {
        let (ctx, store, gateway) = test_context();
        store.put_user(UserId::new(1));
        store.put_user(UserId::new(2));
        store.set_banned(UserId::new(2), true);
        let ad_id = seed_ad(&store).await;

        let run_id = BroadcastService::new(&ctx).start(ad_id, None).await.unwrap();
        let run = wait_for_terminal(&ctx, &run_id).await;

        assert_eq!(run.total_users, 1);
        assert_eq!(gateway.sent_to(), vec![UserId::new(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_continues_above_cursor() {
        let (ctx, store, gateway) = test_context();
        for id in 1..=6 {
            store.put_user(UserId::new(id));
        }
        let ad_id = seed_ad(&store).await;

        // A run interrupted after processing users 1-2 (crash: still
        // 'running' in the store, cursor at 2)
        let mut run = BroadcastRun::new("stale-run", ad_id, 6);
        run.sent_count = 2;
        run.cursor = Some(UserId::new(2));
        ctx.broadcast_repo().create(&run).await.unwrap();

        let broadcasts = BroadcastService::new(&ctx);
        assert_eq!(broadcasts.resume_interrupted().await.unwrap(), 1);

        let run = wait_for_terminal(&ctx, "stale-run").await;
        assert_eq!(run.status, BroadcastStatus::Completed);
        assert_eq!(run.sent_count, 6);
        // Users at or below the cursor were not re-sent
        assert_eq!(
            gateway.sent_to(),
            (3..=6).map(UserId::new).collect::<Vec<_>>()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ad_management_roundtrip() {
        let (ctx, _, _) = test_context();
        let broadcasts = BroadcastService::new(&ctx);

        let id = broadcasts
            .create_ad(&NewAdvertisement {
                title: "Promo".to_string(),
                content: "Text".to_string(),
                created_by: UserId::new(999),
                target_audience: AudienceFilter::All,
            })
            .await
            .unwrap();

        assert_eq!(broadcasts.list_ads(10, true).await.unwrap().len(), 1);

        assert!(!broadcasts.toggle_ad(id).await.unwrap());
        assert!(broadcasts.list_ads(10, true).await.unwrap().is_empty());
        assert_eq!(broadcasts.list_ads(10, false).await.unwrap().len(), 1);

        broadcasts.delete_ad(id).await.unwrap();
        assert!(broadcasts.delete_ad(id).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejects_inactive_ad() {
        let (ctx, store, _) = test_context();
        let ad_id = seed_ad(&store).await;
        store.deactivate_ad(ad_id);

        let err = BroadcastService::new(&ctx)
            .start(ad_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
