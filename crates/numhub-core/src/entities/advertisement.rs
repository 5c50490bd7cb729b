//! Advertisement entity - broadcastable content

use chrono::{DateTime, Utc};

use crate::value_objects::{AdId, AudienceFilter, UserId};

/// Content an admin can fan out to an audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub id: AdId,
    pub title: String,
    pub content: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Total deliveries across completed runs
    pub sent_to: i64,
    pub is_active: bool,
    pub target_audience: AudienceFilter,
}

impl Advertisement {
    /// Message body as delivered to a target
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }
}

/// Fields for creating an advertisement
#[derive(Debug, Clone)]
pub struct NewAdvertisement {
    pub title: String,
    pub content: String,
    pub created_by: UserId,
    pub target_audience: AudienceFilter,
}
