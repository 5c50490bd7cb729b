//! PostgreSQL repository implementations

mod advertisement;
mod broadcast;
mod channel;
mod country;
mod error;
mod ledger;
mod maintenance;
mod number;
mod proof;
mod settings;
mod user;

pub use advertisement::PgAdvertisementRepository;
pub use broadcast::PgBroadcastRepository;
pub use channel::PgChannelRepository;
pub use country::PgCountryRepository;
pub use ledger::PgLedgerRepository;
pub use maintenance::PgMaintenanceRepository;
pub use number::PgNumberRepository;
pub use proof::PgProofRepository;
pub use settings::PgSettingsRepository;
pub use user::PgUserRepository;
