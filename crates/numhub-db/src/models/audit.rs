//! Audit log database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the audit_log table
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogModel {
    pub id: i64,
    pub actor: i64,
    pub action: String,
    pub meta: String,
    pub created_at: DateTime<Utc>,
}
