//! Catalog service
//!
//! Countries and their number counts, served through the TTL cache, plus
//! country administration and the mandatory-channel list. Every write that
//! touches the backing rows invalidates the affected cache kind before the
//! caller observes success.

use tracing::{info, instrument};

use numhub_core::entities::{Country, CountryCounts, CountryOverview, MandatoryChannel, NewCountry};
use numhub_core::value_objects::CountryId;

use super::context::{CacheSet, ServiceContext};
use super::error::{ServiceError, ServiceResult};

/// Catalog service
pub struct CatalogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CatalogService<'a> {
    /// Create a new CatalogService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Active countries with available-number counts (cached ~5 min)
    #[instrument(skip(self))]
    pub async fn countries(&self) -> ServiceResult<Vec<CountryOverview>> {
        let repo = self.ctx.country_repo();
        let list = self
            .ctx
            .caches()
            .countries
            .get_with((), CacheSet::COUNTRIES_TTL, || repo.overview())
            .await?;
        Ok(list)
    }

    /// Total/premium counts for one country (cached ~1 min)
    #[instrument(skip(self))]
    pub async fn counts(&self, id: CountryId) -> ServiceResult<CountryCounts> {
        let repo = self.ctx.country_repo();
        let counts = self
            .ctx
            .caches()
            .country_counts
            .get_with(id, CacheSet::COUNTRY_COUNTS_TTL, || repo.counts(id))
            .await?;
        Ok(counts)
    }

    /// Country row by id
    pub async fn country(&self, id: CountryId) -> ServiceResult<Country> {
        self.ctx
            .country_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Country", id.to_string()))
    }

    /// Create a country and refresh the cached listing
    #[instrument(skip(self, country), fields(name = %country.name))]
    pub async fn create_country(&self, country: &NewCountry) -> ServiceResult<CountryId> {
        let id = self.ctx.country_repo().create(country).await?;
        self.ctx.caches().invalidate_countries();
        info!(country_id = %id, name = %country.name, "Country created");
        Ok(id)
    }

    /// Toggle a country's availability; returns the new state
    #[instrument(skip(self))]
    pub async fn toggle_country(&self, id: CountryId) -> ServiceResult<bool> {
        let active = self.ctx.country_repo().toggle_active(id).await?;
        self.ctx.caches().invalidate_countries();
        info!(country_id = %id, active, "Country toggled");
        Ok(active)
    }

    /// Point a country at a different activation channel
    #[instrument(skip(self))]
    pub async fn set_activation_channel(&self, id: CountryId, channel: &str) -> ServiceResult<()> {
        self.ctx
            .country_repo()
            .set_activation_channel(id, channel)
            .await?;
        self.ctx.caches().invalidate_countries();
        Ok(())
    }

    // === Mandatory channels ===

    /// All mandatory channels
    pub async fn mandatory_channels(&self) -> ServiceResult<Vec<MandatoryChannel>> {
        Ok(self.ctx.channel_repo().list().await?)
    }

    /// Register a mandatory channel
    #[instrument(skip(self))]
    pub async fn add_mandatory_channel(
        &self,
        channel: &str,
        is_group: bool,
        require_join: bool,
    ) -> ServiceResult<()> {
        self.ctx
            .channel_repo()
            .add(channel, is_group, require_join)
            .await?;
        info!(channel, "Mandatory channel added");
        Ok(())
    }

    /// Remove a mandatory channel
    #[instrument(skip(self))]
    pub async fn remove_mandatory_channel(&self, channel: &str) -> ServiceResult<()> {
        self.ctx.channel_repo().remove(channel).await?;
        info!(channel, "Mandatory channel removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;

    #[tokio::test(start_paused = true)]
    async fn test_countries_cached_until_invalidated() {
        let (ctx, store, _) = test_context();
        let catalog = CatalogService::new(&ctx);

        let first = catalog.countries().await.unwrap();
        assert!(first.is_empty());

        let id = catalog
            .create_country(&NewCountry::new("Testland"))
            .await
            .unwrap();

        // create_country invalidated the listing
        let listed = catalog.countries().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);

        // A direct store write without invalidation stays invisible
        store.put_country("Hiddenland");
        assert_eq!(catalog.countries().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_removes_from_listing() {
        let (ctx, _, _) = test_context();
        let catalog = CatalogService::new(&ctx);

        let id = catalog
            .create_country(&NewCountry::new("Testland"))
            .await
            .unwrap();
        assert_eq!(catalog.countries().await.unwrap().len(), 1);

        assert!(!catalog.toggle_country(id).await.unwrap());
        assert!(catalog.countries().await.unwrap().is_empty());

        assert!(catalog.toggle_country(id).await.unwrap());
        assert_eq!(catalog.countries().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_country_is_not_found() {
        let (ctx, _, _) = test_context();
        let catalog = CatalogService::new(&ctx);

        let err = catalog.country(CountryId::new(99)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
