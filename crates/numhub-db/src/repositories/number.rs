//! PostgreSQL implementation of NumberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use numhub_core::entities::{NewNumber, Number};
use numhub_core::traits::{NumberRepository, RepoResult};
use numhub_core::value_objects::{CountryId, NumberId};

use crate::models::NumberModel;

use super::error::{map_db_error, number_not_found};

const NUMBER_COLUMNS: &str = r"
    id, country_id, digits, platform, added_by, added_at,
    is_premium, premium_pattern, times_used, last_used
";

/// PostgreSQL implementation of NumberRepository
#[derive(Clone)]
pub struct PgNumberRepository {
    pool: PgPool,
}

impl PgNumberRepository {
    /// Create a new PgNumberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NumberRepository for PgNumberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: NumberId) -> RepoResult<Option<Number>> {
        let result = sqlx::query_as::<_, NumberModel>(&format!(
            "SELECT {NUMBER_COLUMNS} FROM numbers WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Number::from))
    }

    #[instrument(skip(self, number), fields(digits = %number.digits))]
    async fn insert(&self, country: CountryId, number: &NewNumber) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO numbers (country_id, digits, platform, added_by, is_premium, premium_pattern)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (country_id, digits) DO NOTHING
            ",
        )
        .bind(country.into_inner())
        .bind(&number.digits)
        .bind(&number.platform)
        .bind(number.added_by.map(numhub_core::UserId::into_inner))
        .bind(number.is_premium)
        .bind(number.premium_pattern.map(|p| p.as_str()))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, batch), fields(batch_len = batch.len()))]
    async fn insert_batch(&self, country: CountryId, batch: &[NewNumber]) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let mut inserted = 0u64;

        for number in batch {
            let result = sqlx::query(
                r"
                INSERT INTO numbers (country_id, digits, platform, added_by, is_premium, premium_pattern)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (country_id, digits) DO NOTHING
                ",
            )
            .bind(country.into_inner())
            .bind(&number.digits)
            .bind(&number.platform)
            .bind(number.added_by.map(numhub_core::UserId::into_inner))
            .bind(number.is_premium)
            .bind(number.premium_pattern.map(|p| p.as_str()))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn candidate_ids(
        &self,
        country: CountryId,
        premium_only: bool,
    ) -> RepoResult<Vec<NumberId>> {
        let query = if premium_only {
            "SELECT id FROM numbers WHERE country_id = $1 AND is_premium = TRUE ORDER BY id"
        } else {
            "SELECT id FROM numbers WHERE country_id = $1 ORDER BY id"
        };

        let rows = sqlx::query_scalar::<_, i64>(query)
            .bind(country.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(NumberId::new).collect())
    }

    #[instrument(skip(self))]
    async fn mark_used(&self, id: NumberId) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE numbers SET times_used = times_used + 1, last_used = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(number_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        country: CountryId,
        fragment: &str,
        limit: i64,
    ) -> RepoResult<Vec<Number>> {
        let rows = sqlx::query_as::<_, NumberModel>(&format!(
            r"
            SELECT {NUMBER_COLUMNS} FROM numbers
            WHERE country_id = $1 AND digits LIKE '%' || $2 || '%'
            ORDER BY is_premium DESC, times_used ASC, id ASC
            LIMIT $3
            "
        ))
        .bind(country.into_inner())
        .bind(fragment)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Number::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_matching(&self, country: CountryId, fragment: &str) -> RepoResult<u64> {
        let result = sqlx::query(
            "DELETE FROM numbers WHERE country_id = $1 AND digits LIKE '%' || $2 || '%'",
        )
        .bind(country.into_inner())
        .bind(fragment)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn by_country(&self, country: CountryId, limit: Option<i64>) -> RepoResult<Vec<Number>> {
        let rows = sqlx::query_as::<_, NumberModel>(&format!(
            r"
            SELECT {NUMBER_COLUMNS} FROM numbers
            WHERE country_id = $1
            ORDER BY is_premium DESC, times_used ASC, id ASC
            LIMIT $2
            "
        ))
        .bind(country.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Number::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgNumberRepository>();
    }
}
