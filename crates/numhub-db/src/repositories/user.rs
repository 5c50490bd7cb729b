//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{NewUser, User, UserStats};
use numhub_core::traits::{RepoResult, UserRepository};
use numhub_core::value_objects::{AudienceFilter, UserId};

use crate::models::{UserModel, UserStatsModel};

use super::error::{map_db_error, user_not_found};

const USER_COLUMNS: &str = r"
    id, username, first_name, last_name, joined_at, notified_admin, banned,
    points, invited_by, daily_bonus_claimed, is_pro, pro_expiry,
    total_invites, proofs_submitted, last_activity
";

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_if_absent(&self, user: &NewUser) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_banned(&self, id: UserId, banned: bool) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET banned = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(banned)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_invited_by(&self, id: UserId, inviter: UserId) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Only the first referral sticks
        let linked = sqlx::query(
            r"
            UPDATE users SET invited_by = $2
            WHERE id = $1 AND invited_by IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(inviter.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if linked.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(false);
        }

        sqlx::query("UPDATE users SET total_invites = total_invites + 1 WHERE id = $1")
            .bind(inviter.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn mark_notified(&self, id: UserId) -> RepoResult<()> {
        sqlx::query("UPDATE users SET notified_admin = TRUE WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stats(&self, id: UserId) -> RepoResult<Option<UserStats>> {
        let result = sqlx::query_as::<_, UserStatsModel>(
            "SELECT points, is_pro, pro_expiry FROM users WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UserStats::from))
    }

    #[instrument(skip(self))]
    async fn top_by_points(&self, limit: i64) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(&format!(
            r"
            SELECT {USER_COLUMNS} FROM users
            WHERE points > 0 AND banned = FALSE
            ORDER BY points DESC
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn audience(
        &self,
        filter: AudienceFilter,
        after: Option<UserId>,
    ) -> RepoResult<Vec<UserId>> {
        let query = match filter {
            AudienceFilter::All => {
                "SELECT id FROM users WHERE banned = FALSE AND id > $1 ORDER BY id"
            }
            AudienceFilter::Pro => {
                "SELECT id FROM users WHERE banned = FALSE AND is_pro = TRUE AND id > $1 ORDER BY id"
            }
            AudienceFilter::WithPoints => {
                "SELECT id FROM users WHERE banned = FALSE AND points > 0 AND id > $1 ORDER BY id"
            }
        };

        let rows = sqlx::query_scalar::<_, i64>(query)
            .bind(after.map_or(i64::MIN, UserId::into_inner))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
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
        assert_send_sync::<PgUserRepository>();
    }
}
