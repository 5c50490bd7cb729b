//! Country entity <-> model mappers

use numhub_core::entities::{Country, CountryCounts, CountryOverview};
use numhub_core::value_objects::CountryId;

use crate::models::{CountryCountsModel, CountryModel, CountryOverviewModel};

impl From<CountryModel> for Country {
    fn from(model: CountryModel) -> Self {
        Country {
            id: CountryId::new(model.id),
            name: model.name,
            flag: model.flag,
            platform: model.platform,
            activation_channel: model.activation_channel,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<CountryOverviewModel> for CountryOverview {
    fn from(model: CountryOverviewModel) -> Self {
        CountryOverview {
            id: CountryId::new(model.id),
            name: model.name,
            flag: model.flag,
            platform: model.platform,
            activation_channel: model.activation_channel,
            available_count: model.available_count,
        }
    }
}

impl From<CountryCountsModel> for CountryCounts {
    fn from(model: CountryCountsModel) -> Self {
        CountryCounts {
            total: model.total,
            premium: model.premium,
        }
    }
}
