//! Advertisement database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the advertisements table
#[derive(Debug, Clone, FromRow)]
pub struct AdvertisementModel {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub sent_to: i64,
    pub is_active: bool,
    pub target_audience: String,
}
