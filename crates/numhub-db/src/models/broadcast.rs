//! Broadcast run database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the broadcast_runs table
#[derive(Debug, Clone, FromRow)]
pub struct BroadcastRunModel {
    pub run_id: String,
    pub ad_id: i32,
    pub cursor_user_id: Option<i64>,
    pub total_users: i64,
    pub sent_count: i64,
    pub failed_count: i64,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub errors: String,
}
