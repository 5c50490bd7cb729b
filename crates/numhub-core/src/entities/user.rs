//! User entity - one row per chat-platform account

use chrono::{DateTime, NaiveDate, Utc};

use crate::value_objects::UserId;

/// A bot user, created on first contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub notified_admin: bool,
    pub banned: bool,
    /// Current balance; reconciles against the sum of points-history deltas
    pub points: i64,
    pub invited_by: Option<UserId>,
    /// Calendar date of the last successful daily-bonus claim
    pub daily_bonus_claimed: Option<NaiveDate>,
    pub is_pro: bool,
    pub pro_expiry: Option<DateTime<Utc>>,
    pub total_invites: i32,
    pub proofs_submitted: i32,
    pub last_activity: DateTime<Utc>,
}

impl User {
    /// Best display handle: @username when set, otherwise the first name,
    /// otherwise the raw id
    pub fn display_name(&self) -> String {
        if let Some(username) = &self.username {
            format!("@{username}")
        } else if let Some(first) = &self.first_name {
            first.clone()
        } else {
            self.id.to_string()
        }
    }

    /// Whether the daily bonus can still be claimed on `today`
    /// (calendar-day granularity, not a rolling 24 hours)
    pub fn can_claim_bonus(&self, today: NaiveDate) -> bool {
        match self.daily_bonus_claimed {
            Some(last) => last < today,
            None => true,
        }
    }

    /// Whether the PRO flag is backed by an unexpired subscription at `now`
    pub fn pro_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_pro && self.pro_expiry.is_none_or(|expiry| expiry > now)
    }
}

/// Profile captured on first contact
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Cached per-user snapshot: balance plus PRO state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub points: i64,
    pub is_pro: bool,
    pub pro_expiry: Option<DateTime<Utc>>,
}

impl UserStats {
    /// Whether the snapshot's PRO flag is still valid at `now`
    pub fn pro_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_pro && self.pro_expiry.is_none_or(|expiry| expiry > now)
    }
}
