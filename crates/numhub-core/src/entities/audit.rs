//! Audit log entry

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// One administrative or ledger action, kept for the retention window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: i64,
    pub actor: UserId,
    pub action: String,
    pub meta: String,
    pub created_at: DateTime<Utc>,
}
