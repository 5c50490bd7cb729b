//! Service context - dependency container for services
//!
//! Holds all repositories, the messaging gateway, and the in-process
//! shared state (TTL caches, rate limiter, session store). Cloning is
//! cheap: every field is behind an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use numhub_cache::{RateLimiter, SessionStore, TtlCache};
use numhub_core::entities::{CountryCounts, CountryOverview, UserStats};
use numhub_core::traits::{
    AdvertisementRepository, BroadcastRepository, ChannelRepository, CountryRepository,
    LedgerRepository, MaintenanceRepository, MessagingGateway, NumberRepository, ProofRepository,
    SettingsRepository, UserRepository,
};
use numhub_core::value_objects::{CountryId, UserId};

use super::sessions::UserFlow;

/// The four cached read aggregates, each with its own TTL
pub struct CacheSet {
    /// Active-country list with counts, keyed by unit
    pub countries: TtlCache<(), Vec<CountryOverview>>,
    /// Per-country number counts
    pub country_counts: TtlCache<CountryId, CountryCounts>,
    /// Settings values, keyed by setting name; `None` caches a missing row
    pub settings: TtlCache<String, Option<String>>,
    /// Per-user points/PRO snapshots
    pub user_stats: TtlCache<UserId, UserStats>,
}

impl CacheSet {
    pub const COUNTRIES_TTL: Duration = Duration::from_secs(300);
    pub const COUNTRY_COUNTS_TTL: Duration = Duration::from_secs(60);
    pub const SETTINGS_TTL: Duration = Duration::from_secs(600);
    pub const USER_STATS_TTL: Duration = Duration::from_secs(300);

    fn new() -> Self {
        Self {
            countries: TtlCache::new(),
            country_counts: TtlCache::new(),
            settings: TtlCache::new(),
            user_stats: TtlCache::new(),
        }
    }

    /// Writers touching country or number rows call this before reporting
    /// success
    pub fn invalidate_country(&self, id: CountryId) {
        self.countries.clear();
        self.country_counts.invalidate(&id);
    }

    /// Invalidate every country-related aggregate
    pub fn invalidate_countries(&self) {
        self.countries.clear();
        self.country_counts.clear();
    }

    /// Writers touching a settings row call this before reporting success
    pub fn invalidate_setting(&self, key: &str) {
        self.settings.invalidate(&key.to_string());
    }

    /// Writers touching a user's points or PRO state call this before
    /// reporting success
    pub fn invalidate_user(&self, id: UserId) {
        self.user_stats.invalidate(&id);
    }
}

/// How long an idle conversational session stays alive
const SESSION_TTL: Duration = Duration::from_secs(3600);

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
    country_repo: Arc<dyn CountryRepository>,
    number_repo: Arc<dyn NumberRepository>,
    settings_repo: Arc<dyn SettingsRepository>,
    ad_repo: Arc<dyn AdvertisementRepository>,
    broadcast_repo: Arc<dyn BroadcastRepository>,
    channel_repo: Arc<dyn ChannelRepository>,
    proof_repo: Arc<dyn ProofRepository>,
    maintenance_repo: Arc<dyn MaintenanceRepository>,

    // External gateway
    gateway: Arc<dyn MessagingGateway>,

    // In-process shared state
    caches: Arc<CacheSet>,
    rate_limiter: Arc<RateLimiter>,
    sessions: Arc<SessionStore<UserFlow>>,

    // Settings
    admin_id: UserId,
    broadcast_send_delay: Duration,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        ledger_repo: Arc<dyn LedgerRepository>,
        country_repo: Arc<dyn CountryRepository>,
        number_repo: Arc<dyn NumberRepository>,
        settings_repo: Arc<dyn SettingsRepository>,
        ad_repo: Arc<dyn AdvertisementRepository>,
        broadcast_repo: Arc<dyn BroadcastRepository>,
        channel_repo: Arc<dyn ChannelRepository>,
        proof_repo: Arc<dyn ProofRepository>,
        maintenance_repo: Arc<dyn MaintenanceRepository>,
        gateway: Arc<dyn MessagingGateway>,
        admin_id: UserId,
        broadcast_send_delay: Duration,
    ) -> Self {
        Self {
            user_repo,
            ledger_repo,
            country_repo,
            number_repo,
            settings_repo,
            ad_repo,
            broadcast_repo,
            channel_repo,
            proof_repo,
            maintenance_repo,
            gateway,
            caches: Arc::new(CacheSet::new()),
            rate_limiter: Arc::new(RateLimiter::new()),
            sessions: Arc::new(SessionStore::new(SESSION_TTL)),
            admin_id,
            broadcast_send_delay,
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the ledger repository
    pub fn ledger_repo(&self) -> &dyn LedgerRepository {
        self.ledger_repo.as_ref()
    }

    /// Get the country repository
    pub fn country_repo(&self) -> &dyn CountryRepository {
        self.country_repo.as_ref()
    }

    /// Get the number repository
    pub fn number_repo(&self) -> &dyn NumberRepository {
        self.number_repo.as_ref()
    }

    /// Get the settings repository
    pub fn settings_repo(&self) -> &dyn SettingsRepository {
        self.settings_repo.as_ref()
    }

    /// Get the advertisement repository
    pub fn ad_repo(&self) -> &dyn AdvertisementRepository {
        self.ad_repo.as_ref()
    }

    /// Get the broadcast repository
    pub fn broadcast_repo(&self) -> &dyn BroadcastRepository {
        self.broadcast_repo.as_ref()
    }

    /// Get the channel repository
    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    /// Get the proof repository
    pub fn proof_repo(&self) -> &dyn ProofRepository {
        self.proof_repo.as_ref()
    }

    /// Get the maintenance repository
    pub fn maintenance_repo(&self) -> &dyn MaintenanceRepository {
        self.maintenance_repo.as_ref()
    }

    // === Gateway ===

    /// Get the messaging gateway
    pub fn gateway(&self) -> &dyn MessagingGateway {
        self.gateway.as_ref()
    }

    // === In-process shared state ===

    /// Get the TTL cache set
    pub fn caches(&self) -> &CacheSet {
        &self.caches
    }

    /// Get the rate limiter
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Get the session store
    pub fn sessions(&self) -> &SessionStore<UserFlow> {
        &self.sessions
    }

    // === Settings ===

    /// The administrator's user id
    pub fn admin_id(&self) -> UserId {
        self.admin_id
    }

    /// Pacing delay between broadcast sends
    pub fn broadcast_send_delay(&self) -> Duration {
        self.broadcast_send_delay
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("gateway", &"...")
            .field("admin_id", &self.admin_id)
            .finish()
    }
}
