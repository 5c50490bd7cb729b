//! PostgreSQL implementation of ProofRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::NewProof;
use numhub_core::traits::{ProofRepository, RepoResult};
use numhub_core::value_objects::UserId;

use super::error::{map_db_error, user_not_found};

/// PostgreSQL implementation of ProofRepository
#[derive(Clone)]
pub struct PgProofRepository {
    pool: PgPool,
}

impl PgProofRepository {
    /// Create a new PgProofRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProofRepository for PgProofRepository {
    #[instrument(skip(self, proof), fields(user_id = %proof.user_id))]
    async fn insert(&self, proof: &NewProof) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO proofs (user_id, number, platform, code, country_name)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(proof.user_id.into_inner())
        .bind(&proof.number)
        .bind(&proof.platform)
        .bind(&proof.code)
        .bind(&proof.country_name)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let counted = sqlx::query(
            r"
            UPDATE users
            SET proofs_submitted = proofs_submitted + 1, last_activity = NOW()
            WHERE id = $1
            ",
        )
        .bind(proof.user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if counted.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(user_not_found(proof.user_id));
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_for(&self, id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM proofs WHERE user_id = $1")
            .bind(id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
