//! Mandatory channel entity - membership gates for rewards

/// A channel users must join before earning invite points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatoryChannel {
    pub id: i32,
    /// Channel handle (`@name`) or raw chat id for groups (`-100...`)
    pub channel: String,
    pub is_group: bool,
    pub require_join_for_points: bool,
}
