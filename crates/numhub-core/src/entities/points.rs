//! Points ledger entries

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// Well-known reason tags written to the points history
pub mod reasons {
    pub const DAILY_BONUS: &str = "daily_bonus";
    pub const INVITE: &str = "invite";
    pub const PROOF: &str = "proof";
    pub const PRO_PURCHASE: &str = "pro_purchase";
    pub const ADMIN_ADJUST: &str = "admin_adjust";
}

/// One immutable ledger fact. The sum of a user's deltas reconciles to
/// `User::points`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsEntry {
    pub id: i64,
    pub user_id: UserId,
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Row counts removed by one retention purge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    pub proofs: u64,
    pub audit_entries: u64,
    pub points_entries: u64,
}

impl PurgeCounts {
    pub fn total(&self) -> u64 {
        self.proofs + self.audit_entries + self.points_entries
    }
}
