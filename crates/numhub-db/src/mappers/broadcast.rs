//! Broadcast run entity <-> model mapper

use numhub_core::entities::{BroadcastRun, BroadcastStatus};
use numhub_core::value_objects::{AdId, UserId};

use crate::models::BroadcastRunModel;

impl From<BroadcastRunModel> for BroadcastRun {
    fn from(model: BroadcastRunModel) -> Self {
        BroadcastRun {
            run_id: model.run_id,
            ad_id: AdId::new(model.ad_id),
            cursor: model.cursor_user_id.map(UserId::new),
            total_users: model.total_users,
            sent_count: model.sent_count,
            failed_count: model.failed_count,
            // An unreadable status is treated as terminal; a run must never
            // restart because its tag was corrupted
            status: model.status.parse().unwrap_or(BroadcastStatus::Stopped),
            started_at: model.started_at,
            ended_at: model.ended_at,
            errors: model.errors,
        }
    }
}
