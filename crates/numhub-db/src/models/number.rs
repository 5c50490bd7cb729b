//! Number database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the numbers table
#[derive(Debug, Clone, FromRow)]
pub struct NumberModel {
    pub id: i64,
    pub country_id: i32,
    pub digits: String,
    pub platform: Option<String>,
    pub added_by: Option<i64>,
    pub added_at: DateTime<Utc>,
    pub is_premium: bool,
    pub premium_pattern: Option<String>,
    pub times_used: i32,
    pub last_used: Option<DateTime<Utc>>,
}
