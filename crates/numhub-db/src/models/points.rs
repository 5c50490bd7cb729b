//! Points history database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the points_history table
#[derive(Debug, Clone, FromRow)]
pub struct PointsEntryModel {
    pub id: i64,
    pub user_id: i64,
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
