//! Activation proof submissions
//!
//! Validates the submitted code, records the proof with the user's counter
//! bump, and releases the proof reward through the ledger.

use tracing::{info, instrument};

use numhub_core::entities::{reasons, normalize_proof_code, NewProof};
use numhub_core::value_objects::UserId;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::ledger::LedgerService;
use super::settings::{keys, SettingsService};

/// Proof service
pub struct ProofService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProofService<'a> {
    /// Create a new ProofService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a proof submission and award the configured proof points.
    /// Returns the canonicalized code.
    #[instrument(skip(self, raw_code))]
    pub async fn submit(
        &self,
        user: UserId,
        number: &str,
        platform: Option<String>,
        country_name: &str,
        raw_code: &str,
    ) -> ServiceResult<String> {
        let code = normalize_proof_code(raw_code).ok_or_else(|| {
            ServiceError::validation("activation code must be 4-12 letters or digits")
        })?;

        self.ctx
            .proof_repo()
            .insert(&NewProof {
                user_id: user,
                number: number.to_string(),
                platform,
                code: code.clone(),
                country_name: country_name.to_string(),
            })
            .await?;

        let settings = SettingsService::new(self.ctx);
        let proof_points = settings.int(keys::PROOF_POINTS, 3).await?;
        LedgerService::new(self.ctx)
            .add_points(user, proof_points, reasons::PROOF)
            .await?;

        info!(user_id = %user, country = country_name, "Proof recorded");
        Ok(code)
    }

    /// Submissions by one user
    pub async fn count_for(&self, user: UserId) -> ServiceResult<i64> {
        Ok(self.ctx.proof_repo().count_for(user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;

    #[tokio::test(start_paused = true)]
    async fn test_submit_awards_points_and_counts() {
        let (ctx, store, _) = test_context();
        let proofs = ProofService::new(&ctx);
        let user = UserId::new(1);
        store.put_user(user);

        let code = proofs
            .submit(user, "+4912345", None, "Testland", " ab-12 ")
            .await
            .unwrap();
        assert_eq!(code, "AB12");

        assert_eq!(proofs.count_for(user).await.unwrap(), 1);
        assert_eq!(store.user(user).proofs_submitted, 1);
        assert_eq!(store.history_sum(user), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_code_rejected_without_side_effects() {
        let (ctx, store, _) = test_context();
        let proofs = ProofService::new(&ctx);
        let user = UserId::new(1);
        store.put_user(user);

        let err = proofs
            .submit(user, "+4912345", None, "Testland", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(proofs.count_for(user).await.unwrap(), 0);
        assert_eq!(store.history_sum(user), 0);
    }
}
