//! Country database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the countries table
#[derive(Debug, Clone, FromRow)]
pub struct CountryModel {
    pub id: i32,
    pub name: String,
    pub flag: Option<String>,
    pub platform: String,
    pub activation_channel: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Active-country listing row with its available-number count
#[derive(Debug, Clone, FromRow)]
pub struct CountryOverviewModel {
    pub id: i32,
    pub name: String,
    pub flag: Option<String>,
    pub platform: String,
    pub activation_channel: Option<String>,
    pub available_count: i64,
}

/// Aggregated number counts for one country
#[derive(Debug, Clone, FromRow)]
pub struct CountryCountsModel {
    pub total: i64,
    pub premium: i64,
}
