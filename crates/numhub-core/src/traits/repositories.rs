//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every method documented as atomic runs as a
//! single store transaction in the implementation: it either fully applies
//! or leaves no trace.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::entities::{
    Advertisement, AuditLogEntry, BroadcastRun, BroadcastStatus, Country, CountryCounts,
    CountryOverview, MandatoryChannel, NewAdvertisement, NewCountry, NewNumber, NewProof, NewUser,
    Number, PointsEntry, ProGrant, ProSubscription, PurgeCounts, User, UserStats,
};
use crate::error::DomainError;
use crate::value_objects::{AdId, AudienceFilter, CountryId, NumberId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Insert the user on first contact; returns true if a row was created
    async fn create_if_absent(&self, user: &NewUser) -> RepoResult<bool>;

    /// Flip the banned flag
    async fn set_banned(&self, id: UserId, banned: bool) -> RepoResult<()>;

    /// Record who invited this user and bump the inviter's counter.
    /// Returns false without mutating anything when the user already has
    /// an inviter, so referral credit can never be applied twice.
    async fn set_invited_by(&self, id: UserId, inviter: UserId) -> RepoResult<bool>;

    /// Mark that the admin was told about this user
    async fn mark_notified(&self, id: UserId) -> RepoResult<()>;

    /// Points + PRO snapshot, or None for an unknown user
    async fn stats(&self, id: UserId) -> RepoResult<Option<UserStats>>;

    /// Highest balances first, banned users excluded
    async fn top_by_points(&self, limit: i64) -> RepoResult<Vec<User>>;

    /// Resolve a broadcast audience: non-banned users matching the filter,
    /// ordered by ascending id, optionally restricted to ids above `after`
    async fn audience(
        &self,
        filter: AudienceFilter,
        after: Option<UserId>,
    ) -> RepoResult<Vec<UserId>>;

    /// Total registered users
    async fn count(&self) -> RepoResult<i64>;
}

// ============================================================================
// Ledger Repository
// ============================================================================

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Atomically adjust the balance and append a history row.
    /// Rolls back entirely on any failure - no partial credit.
    async fn add_points(&self, id: UserId, delta: i64, reason: &str) -> RepoResult<()>;

    /// Atomically claim the daily bonus for `today`. Returns false without
    /// mutating anything when the bonus was already claimed on that
    /// calendar date.
    async fn claim_daily_bonus(&self, id: UserId, points: i64, today: NaiveDate)
        -> RepoResult<bool>;

    /// Atomically apply a PRO grant: flag + expiry on the user row, a new
    /// subscription row, and - for points purchases - the debit and its
    /// history entry. Fails with `InsufficientPoints` (rolling everything
    /// back) when the balance does not cover the cost.
    async fn grant_pro(&self, grant: &ProGrant) -> RepoResult<()>;

    /// Clear PRO state and deactivate the active subscription row.
    /// Idempotent: safe to call for a user who is not PRO.
    async fn revoke_pro(&self, id: UserId) -> RepoResult<()>;

    /// Users whose stored expiry has passed but whose flag is still set
    async fn expired_pro_users(&self, now: DateTime<Utc>) -> RepoResult<Vec<UserId>>;

    /// Most recent history entries for a user
    async fn history(&self, id: UserId, limit: i64) -> RepoResult<Vec<PointsEntry>>;

    /// Whether the user already has a history entry with exactly this
    /// reason tag. Backs idempotent one-shot awards (e.g. per-invitee
    /// referral credit).
    async fn has_entry_with_reason(&self, id: UserId, reason: &str) -> RepoResult<bool>;

    /// The currently active subscription, if any
    async fn active_subscription(&self, id: UserId) -> RepoResult<Option<ProSubscription>>;

    /// Sum of all positive deltas ever awarded
    async fn points_distributed(&self) -> RepoResult<i64>;
}

// ============================================================================
// Country Repository
// ============================================================================

#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// Find country by ID
    async fn find_by_id(&self, id: CountryId) -> RepoResult<Option<Country>>;

    /// Active countries with their available-number counts, name-ordered
    async fn overview(&self) -> RepoResult<Vec<CountryOverview>>;

    /// Total and premium number counts for one country
    async fn counts(&self, id: CountryId) -> RepoResult<CountryCounts>;

    /// Create a country; fails with `CountryExists` on a duplicate name
    async fn create(&self, country: &NewCountry) -> RepoResult<CountryId>;

    /// Flip is_active; returns the new state
    async fn toggle_active(&self, id: CountryId) -> RepoResult<bool>;

    /// Update the per-country activation channel
    async fn set_activation_channel(&self, id: CountryId, channel: &str) -> RepoResult<()>;
}

// ============================================================================
// Number Repository
// ============================================================================

#[async_trait]
pub trait NumberRepository: Send + Sync {
    /// Find number by ID
    async fn find_by_id(&self, id: NumberId) -> RepoResult<Option<Number>>;

    /// Insert one number; returns false (without error) when the digits
    /// already exist for the country
    async fn insert(&self, country: CountryId, number: &NewNumber) -> RepoResult<bool>;

    /// Insert a pre-deduplicated batch in one transaction; returns rows
    /// written
    async fn insert_batch(&self, country: CountryId, batch: &[NewNumber]) -> RepoResult<u64>;

    /// Candidate ids for random selection, ascending, optionally premium
    /// only
    async fn candidate_ids(
        &self,
        country: CountryId,
        premium_only: bool,
    ) -> RepoResult<Vec<NumberId>>;

    /// Bump times_used and stamp last_used
    async fn mark_used(&self, id: NumberId) -> RepoResult<()>;

    /// Numbers whose digits contain `fragment`, premium first
    async fn search(
        &self,
        country: CountryId,
        fragment: &str,
        limit: i64,
    ) -> RepoResult<Vec<Number>>;

    /// Delete numbers whose digits contain `fragment`; returns rows removed
    async fn delete_matching(&self, country: CountryId, fragment: &str) -> RepoResult<u64>;

    /// Listing for a country, premium and least-used first
    async fn by_country(&self, country: CountryId, limit: Option<i64>) -> RepoResult<Vec<Number>>;
}

// ============================================================================
// Settings Repository
// ============================================================================

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Read one key; None when absent
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Upsert one key
    async fn set(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Seed defaults without overwriting existing values
    async fn seed_defaults(&self, defaults: &[(&str, &str)]) -> RepoResult<()>;
}

// ============================================================================
// Advertisement Repository
// ============================================================================

#[async_trait]
pub trait AdvertisementRepository: Send + Sync {
    /// Find advertisement by ID
    async fn find_by_id(&self, id: AdId) -> RepoResult<Option<Advertisement>>;

    /// Create a new advertisement
    async fn create(&self, ad: &NewAdvertisement) -> RepoResult<AdId>;

    /// Recent advertisements, newest first
    async fn list(&self, limit: i64, active_only: bool) -> RepoResult<Vec<Advertisement>>;

    /// Flip is_active; returns the new state
    async fn toggle_active(&self, id: AdId) -> RepoResult<bool>;

    /// Add a completed run's delivery count to the lifetime total
    async fn record_sent(&self, id: AdId, sent: i64) -> RepoResult<()>;

    /// Delete an advertisement
    async fn delete(&self, id: AdId) -> RepoResult<()>;
}

// ============================================================================
// Broadcast Repository
// ============================================================================

#[async_trait]
pub trait BroadcastRepository: Send + Sync {
    /// Persist a fresh run descriptor
    async fn create(&self, run: &BroadcastRun) -> RepoResult<()>;

    /// Current status only - the worker polls this between targets
    async fn status(&self, run_id: &str) -> RepoResult<Option<BroadcastStatus>>;

    /// Persist counters and cursor after one delivery attempt; `error`
    /// appends a bounded line to the run's error text
    async fn record_attempt(
        &self,
        run_id: &str,
        cursor: UserId,
        sent: i64,
        failed: i64,
        error: Option<&str>,
    ) -> RepoResult<()>;

    /// Transition running -> completed; false if the run was not running
    async fn mark_completed(&self, run_id: &str) -> RepoResult<bool>;

    /// Transition running -> stopped; false if the run was not running
    async fn mark_stopped(&self, run_id: &str) -> RepoResult<bool>;

    /// Full descriptor
    async fn find(&self, run_id: &str) -> RepoResult<Option<BroadcastRun>>;

    /// Runs still marked running (candidates for resume after a restart)
    async fn running(&self) -> RepoResult<Vec<BroadcastRun>>;
}

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// All mandatory channels
    async fn list(&self) -> RepoResult<Vec<MandatoryChannel>>;

    /// Channels gating point rewards
    async fn required_for_points(&self) -> RepoResult<Vec<MandatoryChannel>>;

    /// Add a channel (no-op if already present)
    async fn add(&self, channel: &str, is_group: bool, require_join: bool) -> RepoResult<()>;

    /// Remove a channel by handle
    async fn remove(&self, channel: &str) -> RepoResult<()>;
}

// ============================================================================
// Proof Repository
// ============================================================================

#[async_trait]
pub trait ProofRepository: Send + Sync {
    /// Atomically insert the proof and bump the user's submission counter
    async fn insert(&self, proof: &NewProof) -> RepoResult<()>;

    /// Submissions by one user
    async fn count_for(&self, id: UserId) -> RepoResult<i64>;
}

// ============================================================================
// Maintenance Repository
// ============================================================================

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Record an audit log entry
    async fn record_audit(&self, actor: UserId, action: &str, meta: &str) -> RepoResult<()>;

    /// Most recent audit entries, newest first
    async fn recent_audit(&self, limit: i64) -> RepoResult<Vec<AuditLogEntry>>;

    /// Delete proofs, audit entries, and points history older than
    /// `cutoff`, all in one transaction
    async fn purge_history(&self, cutoff: DateTime<Utc>) -> RepoResult<PurgeCounts>;
}
