//! PostgreSQL implementation of CountryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{Country, CountryCounts, CountryOverview, NewCountry};
use numhub_core::error::DomainError;
use numhub_core::traits::{CountryRepository, RepoResult};
use numhub_core::value_objects::CountryId;

use crate::models::{CountryCountsModel, CountryModel, CountryOverviewModel};

use super::error::{country_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of CountryRepository
#[derive(Clone)]
pub struct PgCountryRepository {
    pool: PgPool,
}

impl PgCountryRepository {
    /// Create a new PgCountryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryRepository for PgCountryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: CountryId) -> RepoResult<Option<Country>> {
        let result = sqlx::query_as::<_, CountryModel>(
            r"
            SELECT id, name, flag, platform, activation_channel, is_active, created_at
            FROM countries
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Country::from))
    }

    #[instrument(skip(self))]
    async fn overview(&self) -> RepoResult<Vec<CountryOverview>> {
        let rows = sqlx::query_as::<_, CountryOverviewModel>(
            r"
            SELECT c.id, c.name, c.flag, c.platform, c.activation_channel,
                   COUNT(n.id) AS available_count
            FROM countries c
            LEFT JOIN numbers n ON n.country_id = c.id
            WHERE c.is_active = TRUE
            GROUP BY c.id, c.name, c.flag, c.platform, c.activation_channel
            ORDER BY c.name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(CountryOverview::from).collect())
    }

    #[instrument(skip(self))]
    async fn counts(&self, id: CountryId) -> RepoResult<CountryCounts> {
        let result = sqlx::query_as::<_, CountryCountsModel>(
            r"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE is_premium) AS premium
            FROM numbers
            WHERE country_id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(CountryCounts::from(result))
    }

    #[instrument(skip(self, country), fields(name = %country.name))]
    async fn create(&self, country: &NewCountry) -> RepoResult<CountryId> {
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO countries (name, flag, platform, activation_channel)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&country.name)
        .bind(&country.flag)
        .bind(&country.platform)
        .bind(&country.activation_channel)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::CountryExists(country.name.clone()))
        })?;

        Ok(CountryId::new(id))
    }

    #[instrument(skip(self))]
    async fn toggle_active(&self, id: CountryId) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            UPDATE countries SET is_active = NOT is_active
            WHERE id = $1
            RETURNING is_active
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.ok_or_else(|| country_not_found(id))
    }

    #[instrument(skip(self))]
    async fn set_activation_channel(&self, id: CountryId, channel: &str) -> RepoResult<()> {
        let result = sqlx::query("UPDATE countries SET activation_channel = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(channel)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(country_not_found(id));
        }

        Ok(())
    }
}
