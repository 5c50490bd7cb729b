//! Domain entities - core business objects

mod advertisement;
mod audit;
mod broadcast;
mod channel;
mod country;
mod number;
mod points;
mod proof;
mod subscription;
mod user;

pub use advertisement::{Advertisement, NewAdvertisement};
pub use audit::AuditLogEntry;
pub use broadcast::{BroadcastReport, BroadcastRun, BroadcastStatus};
pub use channel::MandatoryChannel;
pub use country::{Country, CountryCounts, CountryOverview, NewCountry};
pub use number::{NewNumber, Number};
pub use points::{PointsEntry, PurgeCounts, reasons};
pub use proof::{NewProof, Proof, normalize_proof_code};
pub use subscription::{ProGrant, ProMethod, ProSubscription};
pub use user::{NewUser, User, UserStats};
