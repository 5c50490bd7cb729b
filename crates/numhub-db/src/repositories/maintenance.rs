//! PostgreSQL implementation of MaintenanceRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{AuditLogEntry, PurgeCounts};
use numhub_core::traits::{MaintenanceRepository, RepoResult};
use numhub_core::value_objects::UserId;

use crate::models::AuditLogModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MaintenanceRepository
#[derive(Clone)]
pub struct PgMaintenanceRepository {
    pool: PgPool,
}

impl PgMaintenanceRepository {
    /// Create a new PgMaintenanceRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaintenanceRepository for PgMaintenanceRepository {
    #[instrument(skip(self))]
    async fn record_audit(&self, actor: UserId, action: &str, meta: &str) -> RepoResult<()> {
        sqlx::query("INSERT INTO audit_log (actor, action, meta) VALUES ($1, $2, $3)")
            .bind(actor.into_inner())
            .bind(action)
            .bind(meta)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_audit(&self, limit: i64) -> RepoResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT id, actor, action, meta, created_at
            FROM audit_log
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn purge_history(&self, cutoff: DateTime<Utc>) -> RepoResult<PurgeCounts> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let proofs = sqlx::query("DELETE FROM proofs WHERE posted_at < $1")
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        let audit_entries = sqlx::query("DELETE FROM audit_log WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        let points_entries = sqlx::query("DELETE FROM points_history WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        tx.commit().await.map_err(map_db_error)?;

        Ok(PurgeCounts {
            proofs,
            audit_entries,
            points_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMaintenanceRepository>();
    }
}
