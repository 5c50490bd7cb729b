//! User database models

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub notified_admin: bool,
    pub banned: bool,
    pub points: i64,
    pub invited_by: Option<i64>,
    pub daily_bonus_claimed: Option<NaiveDate>,
    pub is_pro: bool,
    pub pro_expiry: Option<DateTime<Utc>>,
    pub total_invites: i32,
    pub proofs_submitted: i32,
    pub last_activity: DateTime<Utc>,
}

/// Points + PRO projection used by the stats cache
#[derive(Debug, Clone, FromRow)]
pub struct UserStatsModel {
    pub points: i64,
    pub is_pro: bool,
    pub pro_expiry: Option<DateTime<Utc>>,
}
