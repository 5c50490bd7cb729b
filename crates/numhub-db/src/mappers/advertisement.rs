//! Advertisement entity <-> model mapper

use numhub_core::entities::Advertisement;
use numhub_core::value_objects::{AdId, AudienceFilter, UserId};

use crate::models::AdvertisementModel;

impl From<AdvertisementModel> for Advertisement {
    fn from(model: AdvertisementModel) -> Self {
        Advertisement {
            id: AdId::new(model.id),
            title: model.title,
            content: model.content,
            created_by: UserId::new(model.created_by),
            created_at: model.created_at,
            sent_to: model.sent_to,
            is_active: model.is_active,
            target_audience: AudienceFilter::parse_lossy(&model.target_audience),
        }
    }
}
