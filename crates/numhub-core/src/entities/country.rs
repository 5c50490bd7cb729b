//! Country entity and catalog projections

use chrono::{DateTime, Utc};

use crate::value_objects::CountryId;

/// A country offering numbers. Deactivated rather than deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub flag: Option<String>,
    pub platform: String,
    pub activation_channel: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a country
#[derive(Debug, Clone)]
pub struct NewCountry {
    pub name: String,
    pub flag: Option<String>,
    pub platform: String,
    pub activation_channel: Option<String>,
}

impl NewCountry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: None,
            platform: "Telegram".to_string(),
            activation_channel: None,
        }
    }
}

/// Active-country listing joined with its available-number count.
/// This is the aggregate served by the countries cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryOverview {
    pub id: CountryId,
    pub name: String,
    pub flag: Option<String>,
    pub platform: String,
    pub activation_channel: Option<String>,
    pub available_count: i64,
}

/// Per-country number counts, cached with a short TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountryCounts {
    pub total: i64,
    pub premium: i64,
}
