//! Points/PRO ledger service
//!
//! All balance mutations go through the transactional ledger repository;
//! this layer adds the cache discipline (invalidate the user's cached
//! stats only after a successful commit), the settings lookups, and the
//! lazy PRO expiry path that keeps reads honest between sweeper passes.

use chrono::Utc;
use tracing::{info, instrument};

use numhub_core::entities::{reasons, PointsEntry, ProGrant, ProMethod, ProSubscription, UserStats};
use numhub_core::value_objects::UserId;

use super::context::{CacheSet, ServiceContext};
use super::error::ServiceResult;
use super::membership::MembershipService;
use super::settings::{keys, SettingsService};

/// Ledger service
pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    /// Create a new LedgerService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cached points/PRO snapshot. An unknown user reads as zero points,
    /// no PRO.
    #[instrument(skip(self))]
    pub async fn stats(&self, user: UserId) -> ServiceResult<UserStats> {
        let user_repo = self.ctx.user_repo();
        let stats = self
            .ctx
            .caches()
            .user_stats
            .get_with(user, CacheSet::USER_STATS_TTL, || async move {
                Ok::<_, numhub_core::DomainError>(user_repo.stats(user).await?.unwrap_or(
                    UserStats {
                        points: 0,
                        is_pro: false,
                        pro_expiry: None,
                    },
                ))
            })
            .await?;
        Ok(stats)
    }

    /// Current balance
    pub async fn points(&self, user: UserId) -> ServiceResult<i64> {
        Ok(self.stats(user).await?.points)
    }

    /// Atomically adjust the balance with a history entry, then drop the
    /// cached snapshot
    #[instrument(skip(self))]
    pub async fn add_points(&self, user: UserId, delta: i64, reason: &str) -> ServiceResult<()> {
        self.ctx.ledger_repo().add_points(user, delta, reason).await?;
        self.ctx.caches().invalidate_user(user);

        self.ctx
            .maintenance_repo()
            .record_audit(user, "add_points", &format!("delta={delta} reason={reason}"))
            .await?;

        info!(user_id = %user, delta, reason, "Points adjusted");
        Ok(())
    }

    /// Claim today's bonus. Returns false when it was already claimed on
    /// this calendar date; only one claim per date ever succeeds.
    #[instrument(skip(self))]
    pub async fn claim_daily_bonus(&self, user: UserId) -> ServiceResult<bool> {
        let settings = SettingsService::new(self.ctx);
        let bonus = settings.int(keys::DAILY_BONUS_POINTS, 10).await?;
        let today = Utc::now().date_naive();

        let claimed = self
            .ctx
            .ledger_repo()
            .claim_daily_bonus(user, bonus, today)
            .await?;

        if claimed {
            self.ctx.caches().invalidate_user(user);
            info!(user_id = %user, bonus, "Daily bonus claimed");
        }

        Ok(claimed)
    }

    /// Credit the inviter once the invitee has joined every required
    /// channel. Returns whether points were awarded.
    ///
    /// Idempotent per invitee: the ledger entry carries the invitee's id
    /// in its reason tag, and a second invocation for the same invitee is
    /// a no-op.
    #[instrument(skip(self))]
    pub async fn award_invite_points(
        &self,
        inviter: UserId,
        invitee: UserId,
    ) -> ServiceResult<bool> {
        let reason = format!("{}:{}", reasons::INVITE, invitee);
        if self
            .ctx
            .ledger_repo()
            .has_entry_with_reason(inviter, &reason)
            .await?
        {
            return Ok(false);
        }

        let membership = MembershipService::new(self.ctx);
        if !membership.is_member_of_required(invitee).await? {
            info!(inviter = %inviter, invitee = %invitee, "Invite award deferred: channels not joined");
            return Ok(false);
        }

        let settings = SettingsService::new(self.ctx);
        let invite_points = settings.int(keys::INVITE_POINTS, 5).await?;
        self.add_points(inviter, invite_points, &reason).await?;
        Ok(true)
    }

    /// Purchase PRO with points. The balance check and the debit are one
    /// atomic statement in the store; a short balance rejects the purchase
    /// without any partial state.
    #[instrument(skip(self))]
    pub async fn buy_pro(&self, user: UserId) -> ServiceResult<ProGrant> {
        let settings = SettingsService::new(self.ctx);
        let cost = settings.int(keys::PRO_POINTS_COST, 100).await?;
        let days = settings.int(keys::PRO_DAYS_DURATION, 30).await?;

        let grant = ProGrant::new(user, days as i32, ProMethod::Points, cost, Utc::now());
        self.ctx.ledger_repo().grant_pro(&grant).await?;
        self.ctx.caches().invalidate_user(user);

        self.ctx
            .maintenance_repo()
            .record_audit(user, "buy_pro", &format!("points={cost} days={days}"))
            .await?;

        info!(user_id = %user, cost, days, "PRO purchased");
        Ok(grant)
    }

    /// Administrative PRO grant for `days`, no points involved
    #[instrument(skip(self))]
    pub async fn grant_pro(&self, user: UserId, days: i32) -> ServiceResult<ProGrant> {
        let grant = ProGrant::new(user, days, ProMethod::Admin, 0, Utc::now());
        self.ctx.ledger_repo().grant_pro(&grant).await?;
        self.ctx.caches().invalidate_user(user);

        self.ctx
            .maintenance_repo()
            .record_audit(self.ctx.admin_id(), "grant_pro", &format!("user={user} days={days}"))
            .await?;

        info!(user_id = %user, days, "PRO granted");
        Ok(grant)
    }

    /// Whether the user currently has PRO. A snapshot whose stored expiry
    /// has passed demotes the user synchronously before answering false,
    /// so this path and the expiry sweeper always agree.
    #[instrument(skip(self))]
    pub async fn is_pro(&self, user: UserId) -> ServiceResult<bool> {
        let stats = self.stats(user).await?;
        if !stats.is_pro {
            return Ok(false);
        }

        let now = Utc::now();
        if stats.pro_active_at(now) {
            return Ok(true);
        }

        self.revoke_pro(user).await?;
        Ok(false)
    }

    /// Clear PRO state. Safe on a user who is not PRO; both the expiry
    /// sweeper and admin action funnel through here.
    #[instrument(skip(self))]
    pub async fn revoke_pro(&self, user: UserId) -> ServiceResult<()> {
        self.ctx.ledger_repo().revoke_pro(user).await?;
        self.ctx.caches().invalidate_user(user);
        info!(user_id = %user, "PRO revoked");
        Ok(())
    }

    /// The user's active subscription row, if any
    pub async fn active_subscription(&self, user: UserId) -> ServiceResult<Option<ProSubscription>> {
        Ok(self.ctx.ledger_repo().active_subscription(user).await?)
    }

    /// Recent ledger entries for a user
    pub async fn history(&self, user: UserId, limit: i64) -> ServiceResult<Vec<PointsEntry>> {
        Ok(self.ctx.ledger_repo().history(user, limit).await?)
    }

    /// Sum of all points ever awarded
    pub async fn points_distributed(&self) -> ServiceResult<i64> {
        Ok(self.ctx.ledger_repo().points_distributed().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{test_context, FakeStore};
    use crate::ServiceError;
    use chrono::Duration;
    use numhub_core::DomainError;
    use numhub_core::MembershipStatus;

    fn seed_user(store: &FakeStore, id: i64) -> UserId {
        let user = UserId::new(id);
        store.put_user(user);
        user
    }

    #[tokio::test(start_paused = true)]
    async fn test_points_reconcile_with_history() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        ledger.add_points(user, 10, reasons::ADMIN_ADJUST).await.unwrap();
        ledger.add_points(user, 7, reasons::PROOF).await.unwrap();
        ledger.add_points(user, -4, reasons::ADMIN_ADJUST).await.unwrap();

        assert_eq!(ledger.points(user).await.unwrap(), 13);
        assert_eq!(store.history_sum(user), 13);
        // Every adjustment leaves an audit trail
        assert_eq!(store.audit_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_cache_invalidated_by_writes() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        assert_eq!(ledger.points(user).await.unwrap(), 0);

        ledger.add_points(user, 5, reasons::INVITE).await.unwrap();
        // The write invalidated the snapshot, so the read is current
        assert_eq!(ledger.points(user).await.unwrap(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_bonus_once_per_calendar_day() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        assert!(ledger.claim_daily_bonus(user).await.unwrap());
        assert!(!ledger.claim_daily_bonus(user).await.unwrap());
        assert_eq!(ledger.points(user).await.unwrap(), 10);

        // Next calendar day the claim opens again
        store.backdate_daily_bonus(user, 1);
        assert!(ledger.claim_daily_bonus(user).await.unwrap());
        assert_eq!(ledger.points(user).await.unwrap(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_pro_debits_and_flags() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        ledger.add_points(user, 150, reasons::ADMIN_ADJUST).await.unwrap();
        let grant = ledger.buy_pro(user).await.unwrap();
        assert_eq!(grant.points_cost, 100);

        assert_eq!(ledger.points(user).await.unwrap(), 50);
        assert!(ledger.is_pro(user).await.unwrap());
        assert_eq!(store.history_sum(user), 50);

        let sub = ledger.active_subscription(user).await.unwrap().unwrap();
        assert_eq!(sub.method, ProMethod::Points);
        assert_eq!(sub.points_paid, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_pro_rejects_short_balance() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        ledger.add_points(user, 40, reasons::ADMIN_ADJUST).await.unwrap();
        let err = ledger.buy_pro(user).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InsufficientPoints {
                required: 100,
                available: 40
            })
        ));

        // Nothing was applied
        assert_eq!(ledger.points(user).await.unwrap(), 40);
        assert!(!ledger.is_pro(user).await.unwrap());
        assert_eq!(store.history_sum(user), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_pro_demotes_lazily_after_expiry() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        ledger.grant_pro(user, 30).await.unwrap();
        assert!(ledger.is_pro(user).await.unwrap());

        // Simulate the expiry passing while the cached snapshot is stale
        store.expire_pro(user, Duration::days(31));
        ctx.caches().invalidate_user(user);

        assert!(!ledger.is_pro(user).await.unwrap());
        // The demotion was persisted, not just computed
        assert!(!store.user(user).is_pro);
        assert!(ledger.active_subscription(user).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoke_pro_is_idempotent() {
        let (ctx, store, _) = test_context();
        let ledger = LedgerService::new(&ctx);
        let user = seed_user(&store, 1);

        ledger.revoke_pro(user).await.unwrap();
        ledger.grant_pro(user, 30).await.unwrap();
        ledger.revoke_pro(user).await.unwrap();
        ledger.revoke_pro(user).await.unwrap();

        assert!(!ledger.is_pro(user).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invite_award_requires_membership() {
        let (ctx, store, gateway) = test_context();
        let ledger = LedgerService::new(&ctx);
        let inviter = seed_user(&store, 1);
        let invitee = seed_user(&store, 2);

        store.put_channel("@updates", true);

        // Not joined yet: no credit
        gateway.set_membership("@updates", invitee, MembershipStatus::Left);
        assert!(!ledger.award_invite_points(inviter, invitee).await.unwrap());
        assert_eq!(ledger.points(inviter).await.unwrap(), 0);

        // Joined: credited once
        gateway.set_membership("@updates", invitee, MembershipStatus::Member);
        assert!(ledger.award_invite_points(inviter, invitee).await.unwrap());
        assert_eq!(ledger.points(inviter).await.unwrap(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invite_award_is_idempotent_per_invitee() {
        let (ctx, store, gateway) = test_context();
        let ledger = LedgerService::new(&ctx);
        let inviter = seed_user(&store, 1);
        let first = seed_user(&store, 2);
        let second = seed_user(&store, 3);

        store.put_channel("@updates", true);
        gateway.set_membership("@updates", first, MembershipStatus::Member);
        gateway.set_membership("@updates", second, MembershipStatus::Member);

        assert!(ledger.award_invite_points(inviter, first).await.unwrap());
        // Re-invoking for the same invitee never double-credits
        assert!(!ledger.award_invite_points(inviter, first).await.unwrap());
        assert_eq!(ledger.points(inviter).await.unwrap(), 5);

        // A different invitee is its own credit
        assert!(ledger.award_invite_points(inviter, second).await.unwrap());
        assert_eq!(ledger.points(inviter).await.unwrap(), 10);
        assert_eq!(store.history_sum(inviter), 10);
    }
}
