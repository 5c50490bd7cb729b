//! Proof database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the proofs table
#[derive(Debug, Clone, FromRow)]
pub struct ProofModel {
    pub id: i64,
    pub user_id: i64,
    pub number: String,
    pub platform: Option<String>,
    pub code: String,
    pub country_name: String,
    pub posted_at: DateTime<Utc>,
    pub verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
}
