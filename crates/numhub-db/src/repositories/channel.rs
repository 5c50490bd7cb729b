//! PostgreSQL implementation of ChannelRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::MandatoryChannel;
use numhub_core::traits::{ChannelRepository, RepoResult};

use crate::models::MandatoryChannelModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ChannelRepository
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<MandatoryChannel>> {
        let rows = sqlx::query_as::<_, MandatoryChannelModel>(
            "SELECT id, channel, is_group, require_join_for_points FROM mandatory_channels ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(MandatoryChannel::from).collect())
    }

    #[instrument(skip(self))]
    async fn required_for_points(&self) -> RepoResult<Vec<MandatoryChannel>> {
        let rows = sqlx::query_as::<_, MandatoryChannelModel>(
            r"
            SELECT id, channel, is_group, require_join_for_points
            FROM mandatory_channels
            WHERE require_join_for_points = TRUE
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(MandatoryChannel::from).collect())
    }

    #[instrument(skip(self))]
    async fn add(&self, channel: &str, is_group: bool, require_join: bool) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO mandatory_channels (channel, is_group, require_join_for_points)
            VALUES ($1, $2, $3)
            ON CONFLICT (channel) DO NOTHING
            ",
        )
        .bind(channel)
        .bind(is_group)
        .bind(require_join)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, channel: &str) -> RepoResult<()> {
        sqlx::query("DELETE FROM mandatory_channels WHERE channel = $1")
            .bind(channel)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgChannelRepository>();
    }
}
