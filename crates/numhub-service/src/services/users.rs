//! User service
//!
//! First-contact bootstrap with referral attribution, ban management, and
//! the leaderboard queries.

use tracing::{info, instrument};

use numhub_core::entities::{AuditLogEntry, NewUser, User};
use numhub_core::value_objects::UserId;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::ledger::LedgerService;

/// What happened on first contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardOutcome {
    /// A fresh user row was created
    pub created: bool,
    /// The referral was linked and the inviter credited
    pub invite_credited: bool,
}

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register the user on first contact. A referral link attributes the
    /// invite exactly once; the inviter is credited only when the invitee
    /// has joined the required channels.
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn ensure_user(
        &self,
        profile: &NewUser,
        referred_by: Option<UserId>,
    ) -> ServiceResult<OnboardOutcome> {
        let created = self.ctx.user_repo().create_if_absent(profile).await?;
        let mut invite_credited = false;

        if created {
            self.ctx.caches().invalidate_user(profile.id);
            info!(user_id = %profile.id, "New user registered");

            if let Some(inviter) = referred_by.filter(|inviter| *inviter != profile.id) {
                let linked = self
                    .ctx
                    .user_repo()
                    .set_invited_by(profile.id, inviter)
                    .await?;

                if linked {
                    invite_credited = LedgerService::new(self.ctx)
                        .award_invite_points(inviter, profile.id)
                        .await?;
                }
            }
        }

        Ok(OnboardOutcome {
            created,
            invite_credited,
        })
    }

    /// User row by id
    pub async fn get(&self, id: UserId) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id.to_string()))
    }

    /// Whether the user is banned; unknown users are not
    pub async fn is_banned(&self, id: UserId) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(id)
            .await?
            .is_some_and(|user| user.banned))
    }

    /// Ban a user
    #[instrument(skip(self))]
    pub async fn ban(&self, id: UserId) -> ServiceResult<()> {
        self.ctx.user_repo().set_banned(id, true).await?;
        self.ctx
            .maintenance_repo()
            .record_audit(self.ctx.admin_id(), "ban_user", &format!("user={id}"))
            .await?;
        info!(user_id = %id, "User banned");
        Ok(())
    }

    /// Lift a ban
    #[instrument(skip(self))]
    pub async fn unban(&self, id: UserId) -> ServiceResult<()> {
        self.ctx.user_repo().set_banned(id, false).await?;
        self.ctx
            .maintenance_repo()
            .record_audit(self.ctx.admin_id(), "unban_user", &format!("user={id}"))
            .await?;
        info!(user_id = %id, "User unbanned");
        Ok(())
    }

    /// Highest balances first
    pub async fn top_users(&self, limit: i64) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.user_repo().top_by_points(limit).await?)
    }

    /// Recent administrative/ledger actions, newest first
    pub async fn audit_log(&self, limit: i64) -> ServiceResult<Vec<AuditLogEntry>> {
        Ok(self.ctx.maintenance_repo().recent_audit(limit).await?)
    }

    /// Total registered users
    pub async fn count(&self) -> ServiceResult<i64> {
        Ok(self.ctx.user_repo().count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use numhub_core::MembershipStatus;

    fn profile(id: i64) -> NewUser {
        NewUser {
            id: UserId::new(id),
            username: Some(format!("user{id}")),
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_user_is_idempotent() {
        let (ctx, _, _) = test_context();
        let users = UserService::new(&ctx);

        let outcome = users.ensure_user(&profile(1), None).await.unwrap();
        assert!(outcome.created);

        let outcome = users.ensure_user(&profile(1), None).await.unwrap();
        assert!(!outcome.created);
    }

    #[tokio::test(start_paused = true)]
    async fn test_referral_credits_inviter_exactly_once() {
        let (ctx, store, gateway) = test_context();
        let users = UserService::new(&ctx);
        let ledger = LedgerService::new(&ctx);

        let inviter = UserId::new(1);
        store.put_user(inviter);
        store.put_channel("@updates", true);
        gateway.set_membership("@updates", UserId::new(2), MembershipStatus::Member);

        let outcome = users
            .ensure_user(&profile(2), Some(inviter))
            .await
            .unwrap();
        assert!(outcome.created);
        assert!(outcome.invite_credited);
        assert_eq!(ledger.points(inviter).await.unwrap(), 5);

        // A second contact from the same invitee does not double-credit
        let outcome = users
            .ensure_user(&profile(2), Some(inviter))
            .await
            .unwrap();
        assert!(!outcome.created);
        assert!(!outcome.invite_credited);
        assert_eq!(store.history_sum(inviter), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_referral_is_ignored() {
        let (ctx, store, _) = test_context();
        let users = UserService::new(&ctx);

        let outcome = users
            .ensure_user(&profile(1), Some(UserId::new(1)))
            .await
            .unwrap();
        assert!(outcome.created);
        assert!(!outcome.invite_credited);
        assert_eq!(store.user(UserId::new(1)).invited_by, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ban_roundtrip() {
        let (ctx, store, _) = test_context();
        let users = UserService::new(&ctx);
        let user = UserId::new(1);
        store.put_user(user);

        assert!(!users.is_banned(user).await.unwrap());
        users.ban(user).await.unwrap();
        assert!(users.is_banned(user).await.unwrap());
        users.unban(user).await.unwrap();
        assert!(!users.is_banned(user).await.unwrap());

        // Both actions landed in the audit log, newest first
        let audit = users.audit_log(10).await.unwrap();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].action, "unban_user");
        assert_eq!(audit[1].action, "ban_user");
    }
}
