//! Proof entity <-> model mapper

use numhub_core::entities::Proof;
use numhub_core::value_objects::UserId;

use crate::models::ProofModel;

impl From<ProofModel> for Proof {
    fn from(model: ProofModel) -> Self {
        Proof {
            id: model.id,
            user_id: UserId::new(model.user_id),
            number: model.number,
            platform: model.platform,
            code: model.code,
            country_name: model.country_name,
            posted_at: model.posted_at,
            verified: model.verified,
            verified_by: model.verified_by.map(UserId::new),
            verified_at: model.verified_at,
        }
    }
}
