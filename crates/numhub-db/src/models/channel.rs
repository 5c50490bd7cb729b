//! Mandatory channel database model

use sqlx::FromRow;

/// Database model for the mandatory_channels table
#[derive(Debug, Clone, FromRow)]
pub struct MandatoryChannelModel {
    pub id: i32,
    pub channel: String,
    pub is_group: bool,
    pub require_join_for_points: bool,
}
