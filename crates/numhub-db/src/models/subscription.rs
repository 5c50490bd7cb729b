//! PRO subscription database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the pro_subscriptions table
#[derive(Debug, Clone, FromRow)]
pub struct ProSubscriptionModel {
    pub id: i64,
    pub user_id: i64,
    pub method: String,
    pub points_paid: i64,
    pub days: i32,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}
