//! PostgreSQL implementation of AdvertisementRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{Advertisement, NewAdvertisement};
use numhub_core::error::DomainError;
use numhub_core::traits::{AdvertisementRepository, RepoResult};
use numhub_core::value_objects::AdId;

use crate::models::AdvertisementModel;

use super::error::map_db_error;

const AD_COLUMNS: &str =
    "id, title, content, created_by, created_at, sent_to, is_active, target_audience";

/// PostgreSQL implementation of AdvertisementRepository
#[derive(Clone)]
pub struct PgAdvertisementRepository {
    pool: PgPool,
}

impl PgAdvertisementRepository {
    /// Create a new PgAdvertisementRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdvertisementRepository for PgAdvertisementRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AdId) -> RepoResult<Option<Advertisement>> {
        let result = sqlx::query_as::<_, AdvertisementModel>(&format!(
            "SELECT {AD_COLUMNS} FROM advertisements WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Advertisement::from))
    }

    #[instrument(skip(self, ad), fields(title = %ad.title))]
    async fn create(&self, ad: &NewAdvertisement) -> RepoResult<AdId> {
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO advertisements (title, content, created_by, target_audience)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&ad.title)
        .bind(&ad.content)
        .bind(ad.created_by.into_inner())
        .bind(ad.target_audience.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(AdId::new(id))
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, active_only: bool) -> RepoResult<Vec<Advertisement>> {
        let query = if active_only {
            format!(
                "SELECT {AD_COLUMNS} FROM advertisements WHERE is_active = TRUE \
                 ORDER BY created_at DESC LIMIT $1"
            )
        } else {
            format!("SELECT {AD_COLUMNS} FROM advertisements ORDER BY created_at DESC LIMIT $1")
        };

        let rows = sqlx::query_as::<_, AdvertisementModel>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Advertisement::from).collect())
    }

    #[instrument(skip(self))]
    async fn toggle_active(&self, id: AdId) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            UPDATE advertisements SET is_active = NOT is_active
            WHERE id = $1
            RETURNING is_active
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.ok_or(DomainError::AdvertisementNotFound(id))
    }

    #[instrument(skip(self))]
    async fn record_sent(&self, id: AdId, sent: i64) -> RepoResult<()> {
        sqlx::query("UPDATE advertisements SET sent_to = sent_to + $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(sent)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: AdId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AdvertisementNotFound(id));
        }

        Ok(())
    }
}
