//! Number entity <-> model mapper

use numhub_core::entities::Number;
use numhub_core::value_objects::{CountryId, NumberId, UserId};

use crate::models::NumberModel;

impl From<NumberModel> for Number {
    fn from(model: NumberModel) -> Self {
        Number {
            id: NumberId::new(model.id),
            country_id: CountryId::new(model.country_id),
            digits: model.digits,
            platform: model.platform,
            added_by: model.added_by.map(UserId::new),
            added_at: model.added_at,
            is_premium: model.is_premium,
            // Unrecognized tags read as unclassified rather than failing
            premium_pattern: model.premium_pattern.and_then(|p| p.parse().ok()),
            times_used: model.times_used,
            last_used: model.last_used,
        }
    }
}
