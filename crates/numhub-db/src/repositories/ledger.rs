//! PostgreSQL implementation of LedgerRepository
//!
//! Every mutation here is a single transaction: a balance change and its
//! history row commit together or not at all.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{PointsEntry, ProGrant, ProMethod, ProSubscription};
use numhub_core::error::DomainError;
use numhub_core::traits::{LedgerRepository, RepoResult};
use numhub_core::value_objects::UserId;

use crate::models::{PointsEntryModel, ProSubscriptionModel};

use super::error::{map_db_error, user_not_found};

/// PostgreSQL implementation of LedgerRepository
#[derive(Clone)]
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    /// Create a new PgLedgerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    #[instrument(skip(self))]
    async fn add_points(&self, id: UserId, delta: i64, reason: &str) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let updated = sqlx::query(
            r"
            UPDATE users SET points = points + $2, last_activity = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(delta)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(user_not_found(id));
        }

        sqlx::query("INSERT INTO points_history (user_id, delta, reason) VALUES ($1, $2, $3)")
            .bind(id.into_inner())
            .bind(delta)
            .bind(reason)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn claim_daily_bonus(
        &self,
        id: UserId,
        points: i64,
        today: NaiveDate,
    ) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // The guard and the credit are one statement: two concurrent claims
        // on the same date cannot both pass
        let claimed = sqlx::query(
            r"
            UPDATE users
            SET points = points + $2, daily_bonus_claimed = $3, last_activity = NOW()
            WHERE id = $1
              AND (daily_bonus_claimed IS NULL OR daily_bonus_claimed < $3)
            ",
        )
        .bind(id.into_inner())
        .bind(points)
        .bind(today)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if claimed.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)",
            )
            .bind(id.into_inner())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

            tx.rollback().await.map_err(map_db_error)?;
            return if exists { Ok(false) } else { Err(user_not_found(id)) };
        }

        sqlx::query("INSERT INTO points_history (user_id, delta, reason) VALUES ($1, $2, $3)")
            .bind(id.into_inner())
            .bind(points)
            .bind(numhub_core::entities::reasons::DAILY_BONUS)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(true)
    }

    #[instrument(skip(self, grant), fields(user_id = %grant.user_id, method = %grant.method))]
    async fn grant_pro(&self, grant: &ProGrant) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        if grant.method == ProMethod::Points && grant.points_cost > 0 {
            // Balance check and debit as one conditional statement
            let debited = sqlx::query(
                r"
                UPDATE users SET points = points - $2
                WHERE id = $1 AND points >= $2
                ",
            )
            .bind(grant.user_id.into_inner())
            .bind(grant.points_cost)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if debited.rows_affected() == 0 {
                let available =
                    sqlx::query_scalar::<_, i64>("SELECT points FROM users WHERE id = $1")
                        .bind(grant.user_id.into_inner())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(map_db_error)?;

                tx.rollback().await.map_err(map_db_error)?;
                return Err(match available {
                    Some(available) => DomainError::InsufficientPoints {
                        required: grant.points_cost,
                        available,
                    },
                    None => user_not_found(grant.user_id),
                });
            }

            sqlx::query(
                "INSERT INTO points_history (user_id, delta, reason) VALUES ($1, $2, $3)",
            )
            .bind(grant.user_id.into_inner())
            .bind(-grant.points_cost)
            .bind(numhub_core::entities::reasons::PRO_PURCHASE)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        // Supersede any previous subscription so at most one row stays active
        sqlx::query(
            "UPDATE pro_subscriptions SET is_active = FALSE WHERE user_id = $1 AND is_active",
        )
        .bind(grant.user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO pro_subscriptions (user_id, method, points_paid, days, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(grant.user_id.into_inner())
        .bind(grant.method.as_str())
        .bind(grant.points_cost)
        .bind(grant.days)
        .bind(grant.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Same expires_at value as the subscription row above
        let flagged = sqlx::query(
            r"
            UPDATE users SET is_pro = TRUE, pro_expiry = $2, last_activity = NOW()
            WHERE id = $1
            ",
        )
        .bind(grant.user_id.into_inner())
        .bind(grant.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if flagged.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(user_not_found(grant.user_id));
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_pro(&self, id: UserId) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("UPDATE users SET is_pro = FALSE, pro_expiry = NULL WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(
            "UPDATE pro_subscriptions SET is_active = FALSE WHERE user_id = $1 AND is_active",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn expired_pro_users(&self, now: DateTime<Utc>) -> RepoResult<Vec<UserId>> {
        let rows = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM users
            WHERE is_pro = TRUE AND pro_expiry IS NOT NULL AND pro_expiry < $1
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self))]
    async fn history(&self, id: UserId, limit: i64) -> RepoResult<Vec<PointsEntry>> {
        let rows = sqlx::query_as::<_, PointsEntryModel>(
            r"
            SELECT id, user_id, delta, reason, created_at
            FROM points_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(PointsEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn has_entry_with_reason(&self, id: UserId, reason: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM points_history WHERE user_id = $1 AND reason = $2)",
        )
        .bind(id.into_inner())
        .bind(reason)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn active_subscription(&self, id: UserId) -> RepoResult<Option<ProSubscription>> {
        let result = sqlx::query_as::<_, ProSubscriptionModel>(
            r"
            SELECT id, user_id, method, points_paid, days, started_at, expires_at, is_active
            FROM pro_subscriptions
            WHERE user_id = $1 AND is_active
            ORDER BY started_at DESC
            LIMIT 1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ProSubscription::from))
    }

    #[instrument(skip(self))]
    async fn points_distributed(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM points_history WHERE delta > 0",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgLedgerRepository>();
    }
}
