//! Number selection and administration
//!
//! Random picks avoid ordering the whole candidate set: small pools are
//! chosen from directly, large pools go through a constant-size index
//! sample. Pattern search is a PRO feature; inserts classify premium
//! patterns once so every path agrees.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, instrument};

use numhub_core::entities::{NewNumber, Number};
use numhub_core::value_objects::{CountryId, NumberId, UserId};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::ledger::LedgerService;

/// Pools below this size are sampled directly
const SMALL_POOL_THRESHOLD: usize = 100;
/// Index positions drawn for large pools
const SAMPLE_SIZE: usize = 10;
/// Result cap for pattern search
const SEARCH_LIMIT: i64 = 50;
/// Batch size for bulk imports
const IMPORT_CHUNK: usize = 500;

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub processed: usize,
    pub inserted: u64,
    pub skipped: usize,
}

/// Number service
pub struct NumberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NumberService<'a> {
    /// Create a new NumberService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Pick an available number for a country at random and mark it used.
    ///
    /// With `prefer_premium` the candidate pool is restricted to premium
    /// numbers first, falling back to the whole pool when none exist.
    /// Returns `None` when the country has no numbers at all.
    #[instrument(skip(self))]
    pub async fn pick_random(
        &self,
        country: CountryId,
        prefer_premium: bool,
    ) -> ServiceResult<Option<Number>> {
        let repo = self.ctx.number_repo();

        let mut candidates = repo.candidate_ids(country, prefer_premium).await?;
        if candidates.is_empty() && prefer_premium {
            candidates = repo.candidate_ids(country, false).await?;
        }

        let Some(chosen) = choose_candidate(&candidates) else {
            return Ok(None);
        };

        repo.mark_used(chosen).await?;
        let number = repo
            .find_by_id(chosen)
            .await?
            .ok_or_else(|| ServiceError::not_found("Number", chosen.to_string()))?;

        Ok(Some(number))
    }

    /// Add a single number, classifying its premium pattern
    #[instrument(skip(self))]
    pub async fn add_number(
        &self,
        country: CountryId,
        digits: &str,
        platform: Option<String>,
        added_by: Option<UserId>,
    ) -> ServiceResult<bool> {
        let digits = digits.trim();
        if digits.len() < 3 {
            return Err(ServiceError::validation("number too short"));
        }

        let number = NewNumber::classified(digits, platform, added_by);
        let inserted = self.ctx.number_repo().insert(country, &number).await?;

        if inserted {
            self.ctx.caches().invalidate_country(country);
            info!(country_id = %country, premium = number.is_premium, "Number added");
        }

        Ok(inserted)
    }

    /// Bulk-import numbers, skipping blanks, short values, and duplicates
    #[instrument(skip(self, lines))]
    pub async fn import_numbers<I>(
        &self,
        country: CountryId,
        added_by: Option<UserId>,
        lines: I,
    ) -> ServiceResult<ImportStats>
    where
        I: IntoIterator<Item = String>,
    {
        let mut stats = ImportStats::default();
        let mut batch: Vec<NewNumber> = Vec::with_capacity(IMPORT_CHUNK);

        for line in lines {
            stats.processed += 1;

            let digits = line.trim();
            if digits.len() < 3 {
                stats.skipped += 1;
                continue;
            }

            batch.push(NewNumber::classified(digits, None, added_by));

            if batch.len() >= IMPORT_CHUNK {
                stats.inserted += self.ctx.number_repo().insert_batch(country, &batch).await?;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            stats.inserted += self.ctx.number_repo().insert_batch(country, &batch).await?;
        }

        // Duplicates the store refused also count as skipped
        stats.skipped += stats.processed - stats.skipped - stats.inserted as usize;

        self.ctx.caches().invalidate_country(country);
        info!(
            country_id = %country,
            processed = stats.processed,
            inserted = stats.inserted,
            skipped = stats.skipped,
            "Bulk import finished"
        );

        Ok(stats)
    }

    /// PRO-only substring search over a country's numbers
    #[instrument(skip(self))]
    pub async fn search_by_fragment(
        &self,
        user: UserId,
        country: CountryId,
        fragment: &str,
    ) -> ServiceResult<Vec<Number>> {
        if !LedgerService::new(self.ctx).is_pro(user).await? {
            return Err(ServiceError::validation(
                "pattern search requires an active PRO subscription",
            ));
        }

        let fragment: String = fragment.chars().filter(char::is_ascii_digit).collect();
        if fragment.is_empty() {
            return Err(ServiceError::validation("search pattern must contain digits"));
        }

        Ok(self
            .ctx
            .number_repo()
            .search(country, &fragment, SEARCH_LIMIT)
            .await?)
    }

    /// Delete numbers matching a digit fragment; returns rows removed
    #[instrument(skip(self))]
    pub async fn delete_matching(
        &self,
        country: CountryId,
        fragment: &str,
    ) -> ServiceResult<u64> {
        let removed = self
            .ctx
            .number_repo()
            .delete_matching(country, fragment)
            .await?;

        if removed > 0 {
            self.ctx.caches().invalidate_country(country);
            info!(country_id = %country, removed, "Numbers deleted");
        }

        Ok(removed)
    }

    /// Country listing, premium and least-used first
    pub async fn list(
        &self,
        country: CountryId,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<Number>> {
        Ok(self.ctx.number_repo().by_country(country, limit).await?)
    }
}

/// Uniform-ish choice that never sorts or shuffles the whole pool: small
/// pools are chosen from directly; large pools go through a fixed-size
/// sample of index positions drawn without replacement.
fn choose_candidate(candidates: &[NumberId]) -> Option<NumberId> {
    let mut rng = rand::thread_rng();

    if candidates.len() < SMALL_POOL_THRESHOLD {
        return candidates.choose(&mut rng).copied();
    }

    let positions = rand::seq::index::sample(&mut rng, candidates.len(), SAMPLE_SIZE);
    let position = positions.index(rng.gen_range(0..SAMPLE_SIZE));
    Some(candidates[position])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_context;

    #[test]
    fn test_choose_from_empty_pool() {
        assert_eq!(choose_candidate(&[]), None);
    }

    #[test]
    fn test_choose_from_small_pool() {
        let pool: Vec<NumberId> = (1..10).map(NumberId::new).collect();
        for _ in 0..50 {
            let chosen = choose_candidate(&pool).unwrap();
            assert!(pool.contains(&chosen));
        }
    }

    #[test]
    fn test_choose_from_large_pool() {
        let pool: Vec<NumberId> = (1..=5000).map(NumberId::new).collect();
        for _ in 0..50 {
            let chosen = choose_candidate(&pool).unwrap();
            assert!(pool.contains(&chosen));
        }
    }

    #[test]
    fn test_large_pool_is_not_visibly_biased() {
        // No single candidate should dominate a modest set of draws
        let pool: Vec<NumberId> = (1..=1000).map(NumberId::new).collect();
        let mut firsts = 0;
        for _ in 0..200 {
            if choose_candidate(&pool) == Some(NumberId::new(1)) {
                firsts += 1;
            }
        }
        assert!(firsts < 20, "candidate 1 drawn {firsts}/200 times");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_prefers_premium() {
        let (ctx, store, _) = test_context();
        let numbers = NumberService::new(&ctx);

        let country = store.put_country("Testland");
        store.put_number(country, "13579");
        store.put_number(country, "24680");
        store.put_number(country, "5550001");

        for _ in 0..10 {
            let picked = numbers.pick_random(country, true).await.unwrap().unwrap();
            assert!(picked.is_premium, "picked non-premium {}", picked.digits);
            assert_eq!(picked.digits, "5550001");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_falls_back_when_no_premium() {
        let (ctx, store, _) = test_context();
        let numbers = NumberService::new(&ctx);

        let country = store.put_country("Testland");
        store.put_number(country, "13579");

        let picked = numbers.pick_random(country, true).await.unwrap().unwrap();
        assert_eq!(picked.digits, "13579");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_from_empty_country() {
        let (ctx, store, _) = test_context();
        let numbers = NumberService::new(&ctx);

        let country = store.put_country("Testland");
        assert!(numbers.pick_random(country, false).await.unwrap().is_none());
        assert!(numbers.pick_random(country, true).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_marks_used() {
        let (ctx, store, _) = test_context();
        let numbers = NumberService::new(&ctx);

        let country = store.put_country("Testland");
        store.put_number(country, "13579");

        let picked = numbers.pick_random(country, false).await.unwrap().unwrap();
        assert_eq!(store.times_used(picked.id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_skips_blanks_and_duplicates() {
        let (ctx, store, _) = test_context();
        let numbers = NumberService::new(&ctx);

        let country = store.put_country("Testland");
        store.put_number(country, "4910001");

        let lines = vec![
            "4910001".to_string(), // duplicate
            "4910002".to_string(),
            " 4910003 ".to_string(),
            "".to_string(),
            "12".to_string(), // too short
        ];

        let stats = numbers
            .import_numbers(country, None, lines)
            .await
            .unwrap();
        assert_eq!(stats.processed, 5);
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.skipped, 3);

        let counts = ctx.country_repo().counts(country).await.unwrap();
        assert_eq!(counts.total, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_requires_pro() {
        let (ctx, store, _) = test_context();
        let numbers = NumberService::new(&ctx);
        let user = UserId::new(1);
        store.put_user(user);

        let country = store.put_country("Testland");
        let err = numbers
            .search_by_fragment(user, country, "555")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
