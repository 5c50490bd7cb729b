//! Value objects - typed identifiers and domain-level classifications

mod audience;
mod ids;
mod pattern;

pub use audience::AudienceFilter;
pub use ids::{AdId, CountryId, NumberId, UserId};
pub use pattern::PremiumPattern;
