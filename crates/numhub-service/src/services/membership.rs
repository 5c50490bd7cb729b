//! Channel membership gating
//!
//! Reward paths require the user to be joined to every mandatory channel.
//! A gateway failure for a channel counts as not joined: rewards are only
//! ever released on positive confirmation.

use tracing::{instrument, warn};

use numhub_core::value_objects::UserId;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Whether the user is joined to every channel gating point rewards.
    /// Vacuously true when no channels are configured.
    #[instrument(skip(self))]
    pub async fn is_member_of_required(&self, user: UserId) -> ServiceResult<bool> {
        Ok(self.missing_channels(user).await?.is_empty())
    }

    /// The gating channels the user has not joined
    #[instrument(skip(self))]
    pub async fn missing_channels(&self, user: UserId) -> ServiceResult<Vec<String>> {
        let required = self.ctx.channel_repo().required_for_points().await?;
        let mut missing = Vec::new();

        for channel in required {
            let joined = match self
                .ctx
                .gateway()
                .membership_status(&channel.channel, user)
                .await
            {
                Ok(status) => status.is_joined(),
                Err(e) => {
                    warn!(channel = %channel.channel, user_id = %user, error = %e,
                          "Membership check failed; treating as not joined");
                    false
                }
            };

            if !joined {
                missing.push(channel.channel);
            }
        }

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;
    use numhub_core::MembershipStatus;

    #[tokio::test(start_paused = true)]
    async fn test_no_channels_means_member() {
        let (ctx, _, _) = test_context();
        let membership = MembershipService::new(&ctx);

        assert!(membership
            .is_member_of_required(UserId::new(1))
            .await
            .unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_channels_reported() {
        let (ctx, store, gateway) = test_context();
        let membership = MembershipService::new(&ctx);
        let user = UserId::new(1);

        store.put_channel("@one", true);
        store.put_channel("@two", true);
        // Channels not gating points are ignored
        store.put_channel("@optional", false);

        gateway.set_membership("@one", user, MembershipStatus::Member);
        gateway.set_membership("@two", user, MembershipStatus::Left);

        let missing = membership.missing_channels(user).await.unwrap();
        assert_eq!(missing, vec!["@two".to_string()]);
        assert!(!membership.is_member_of_required(user).await.unwrap());

        gateway.set_membership("@two", user, MembershipStatus::Admin);
        assert!(membership.is_member_of_required(user).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_counts_as_missing() {
        let (ctx, store, _) = test_context();
        let membership = MembershipService::new(&ctx);

        store.put_channel("@one", true);
        // No membership recorded: the fake gateway answers Unknown

        assert!(!membership
            .is_member_of_required(UserId::new(1))
            .await
            .unwrap());
    }
}
