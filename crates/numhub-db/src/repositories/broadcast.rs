//! PostgreSQL implementation of BroadcastRepository
//!
//! The progress row is the durable source of truth for a run. Status
//! transitions are guarded in SQL (`WHERE status = 'running'`) so they only
//! ever move forward, and counter updates are single statements so a crash
//! loses at most the in-flight attempt.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{BroadcastRun, BroadcastStatus};
use numhub_core::traits::{BroadcastRepository, RepoResult};
use numhub_core::value_objects::UserId;

use crate::models::BroadcastRunModel;

use super::error::{map_db_error, run_not_found};

const RUN_COLUMNS: &str = r"
    run_id, ad_id, cursor_user_id, total_users, sent_count, failed_count,
    status, started_at, ended_at, errors
";

/// Cap on the accumulated error text per run
const MAX_ERRORS_LEN: i32 = 4000;

/// PostgreSQL implementation of BroadcastRepository
#[derive(Clone)]
pub struct PgBroadcastRepository {
    pool: PgPool,
}

impl PgBroadcastRepository {
    /// Create a new PgBroadcastRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BroadcastRepository for PgBroadcastRepository {
    #[instrument(skip(self, run), fields(run_id = %run.run_id, total = run.total_users))]
    async fn create(&self, run: &BroadcastRun) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO broadcast_runs
                (run_id, ad_id, cursor_user_id, total_users, sent_count, failed_count,
                 status, started_at, ended_at, errors)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(&run.run_id)
        .bind(run.ad_id.into_inner())
        .bind(run.cursor.map(UserId::into_inner))
        .bind(run.total_users)
        .bind(run.sent_count)
        .bind(run.failed_count)
        .bind(run.status.as_str())
        .bind(run.started_at)
        .bind(run.ended_at)
        .bind(&run.errors)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn status(&self, run_id: &str) -> RepoResult<Option<BroadcastStatus>> {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT status FROM broadcast_runs WHERE run_id = $1",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(|s| s.parse().unwrap_or(BroadcastStatus::Stopped)))
    }

    #[instrument(skip(self, error))]
    async fn record_attempt(
        &self,
        run_id: &str,
        cursor: UserId,
        sent: i64,
        failed: i64,
        error: Option<&str>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE broadcast_runs
            SET sent_count = $2,
                failed_count = $3,
                cursor_user_id = $4,
                errors = CASE
                    WHEN $5::TEXT IS NULL THEN errors
                    ELSE LEFT(errors || $5 || E'\n', $6)
                END
            WHERE run_id = $1
            ",
        )
        .bind(run_id)
        .bind(sent)
        .bind(failed)
        .bind(cursor.into_inner())
        .bind(error)
        .bind(MAX_ERRORS_LEN)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(run_not_found(run_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_completed(&self, run_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE broadcast_runs
            SET status = 'completed', ended_at = NOW()
            WHERE run_id = $1 AND status = 'running'
            ",
        )
        .bind(run_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_stopped(&self, run_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE broadcast_runs
            SET status = 'stopped', ended_at = NOW()
            WHERE run_id = $1 AND status = 'running'
            ",
        )
        .bind(run_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find(&self, run_id: &str) -> RepoResult<Option<BroadcastRun>> {
        let result = sqlx::query_as::<_, BroadcastRunModel>(&format!(
            "SELECT {RUN_COLUMNS} FROM broadcast_runs WHERE run_id = $1"
        ))
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(BroadcastRun::from))
    }

    #[instrument(skip(self))]
    async fn running(&self) -> RepoResult<Vec<BroadcastRun>> {
        let rows = sqlx::query_as::<_, BroadcastRunModel>(&format!(
            "SELECT {RUN_COLUMNS} FROM broadcast_runs WHERE status = 'running' ORDER BY started_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(BroadcastRun::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgBroadcastRepository>();
    }
}
