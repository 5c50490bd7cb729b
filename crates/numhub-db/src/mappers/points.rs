//! Points entry entity <-> model mapper

use numhub_core::entities::PointsEntry;
use numhub_core::value_objects::UserId;

use crate::models::PointsEntryModel;

impl From<PointsEntryModel> for PointsEntry {
    fn from(model: PointsEntryModel) -> Self {
        PointsEntry {
            id: model.id,
            user_id: UserId::new(model.user_id),
            delta: model.delta,
            reason: model.reason,
            created_at: model.created_at,
        }
    }
}
