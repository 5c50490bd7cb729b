//! Database models - SQLx `FromRow` structs mirroring table columns

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

pub use advertisement::AdvertisementModel;
pub use audit::AuditLogModel;
pub use broadcast::BroadcastRunModel;
pub use channel::MandatoryChannelModel;
pub use country::{CountryCountsModel, CountryModel, CountryOverviewModel};
pub use number::NumberModel;
pub use points::PointsEntryModel;
pub use proof::ProofModel;
pub use subscription::ProSubscriptionModel;
pub use user::{UserModel, UserStatsModel};
