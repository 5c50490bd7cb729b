//! User entity <-> model mapper

use numhub_core::entities::{User, UserStats};
use numhub_core::value_objects::UserId;

use crate::models::{UserModel, UserStatsModel};

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.id),
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            joined_at: model.joined_at,
            notified_admin: model.notified_admin,
            banned: model.banned,
            points: model.points,
            invited_by: model.invited_by.map(UserId::new),
            daily_bonus_claimed: model.daily_bonus_claimed,
            is_pro: model.is_pro,
            pro_expiry: model.pro_expiry,
            total_invites: model.total_invites,
            proofs_submitted: model.proofs_submitted,
            last_activity: model.last_activity,
        }
    }
}

/// Convert the stats projection to the cached snapshot type
impl From<UserStatsModel> for UserStats {
    fn from(model: UserStatsModel) -> Self {
        UserStats {
            points: model.points,
            is_pro: model.is_pro,
            pro_expiry: model.pro_expiry,
        }
    }
}
