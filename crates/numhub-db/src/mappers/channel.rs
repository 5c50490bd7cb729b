//! Mandatory channel entity <-> model mapper

use numhub_core::entities::MandatoryChannel;

use crate::models::MandatoryChannelModel;

impl From<MandatoryChannelModel> for MandatoryChannel {
    fn from(model: MandatoryChannelModel) -> Self {
        MandatoryChannel {
            id: model.id,
            channel: model.channel,
            is_group: model.is_group,
            require_join_for_points: model.require_join_for_points,
        }
    }
}
