//! PRO subscription entity <-> model mapper

use numhub_core::entities::{ProMethod, ProSubscription};
use numhub_core::value_objects::UserId;

use crate::models::ProSubscriptionModel;

impl From<ProSubscriptionModel> for ProSubscription {
    fn from(model: ProSubscriptionModel) -> Self {
        ProSubscription {
            id: model.id,
            user_id: UserId::new(model.user_id),
            method: model.method.parse().unwrap_or(ProMethod::Admin),
            points_paid: model.points_paid,
            days: model.days,
            started_at: model.started_at,
            expires_at: model.expires_at,
            is_active: model.is_active,
        }
    }
}
