//! Conversational session state
//!
//! One explicit store replaces ad-hoc per-feature user-state maps. Every
//! flow a user can be in the middle of is a `UserFlow` variant; acting on
//! a session the sweeper already evicted surfaces as `SessionExpired`.

use tracing::instrument;

use numhub_core::value_objects::{CountryId, NumberId, UserId};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What a user is currently in the middle of
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFlow {
    /// Waiting for the user to send an activation code
    AwaitingProof {
        number: String,
        platform: Option<String>,
        country_name: String,
    },
    /// Paging through a country's numbers
    Browsing {
        country_id: CountryId,
        last_number: Option<NumberId>,
    },
    /// Waiting for a pattern-search fragment (PRO feature)
    AwaitingPattern { country_id: CountryId },
    /// Multi-step admin wizard
    AdminWizard { action: String, step: u8 },
}

/// Session service
pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    /// Create a new SessionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start (or replace) the user's flow
    #[instrument(skip(self, flow))]
    pub fn begin(&self, user: UserId, flow: UserFlow) {
        self.ctx.sessions().set(user, flow);
    }

    /// Read the current flow without consuming it
    pub fn current(&self, user: UserId) -> ServiceResult<UserFlow> {
        self.ctx
            .sessions()
            .get(user)
            .ok_or(ServiceError::SessionExpired)
    }

    /// Consume the current flow; the follow-up action is underway
    pub fn take(&self, user: UserId) -> ServiceResult<UserFlow> {
        let flow = self.current(user)?;
        self.ctx.sessions().clear(user);
        Ok(flow)
    }

    /// Keep the flow alive across a long interaction
    pub fn touch(&self, user: UserId) -> bool {
        self.ctx.sessions().touch(user)
    }

    /// Abandon the flow; returns whether one existed
    pub fn cancel(&self, user: UserId) -> bool {
        self.ctx.sessions().clear(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;

    #[tokio::test(start_paused = true)]
    async fn test_flow_roundtrip() {
        let (ctx, _, _) = test_context();
        let sessions = SessionService::new(&ctx);
        let user = UserId::new(1);

        assert!(matches!(
            sessions.current(user),
            Err(ServiceError::SessionExpired)
        ));

        sessions.begin(
            user,
            UserFlow::AwaitingPattern {
                country_id: CountryId::new(3),
            },
        );
        assert_eq!(
            sessions.current(user).unwrap(),
            UserFlow::AwaitingPattern {
                country_id: CountryId::new(3)
            }
        );

        // take consumes
        sessions.take(user).unwrap();
        assert!(matches!(
            sessions.take(user),
            Err(ServiceError::SessionExpired)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_flow_surfaces_as_session_expired() {
        let (ctx, _, _) = test_context();
        let sessions = SessionService::new(&ctx);
        let user = UserId::new(1);

        sessions.begin(
            user,
            UserFlow::AdminWizard {
                action: "add_country".to_string(),
                step: 2,
            },
        );

        tokio::time::advance(std::time::Duration::from_secs(3601)).await;
        assert!(matches!(
            sessions.current(user),
            Err(ServiceError::SessionExpired)
        ));
    }
}
