//! Audit log entity <-> model mapper

use numhub_core::entities::AuditLogEntry;
use numhub_core::value_objects::UserId;

use crate::models::AuditLogModel;

impl From<AuditLogModel> for AuditLogEntry {
    fn from(model: AuditLogModel) -> Self {
        AuditLogEntry {
            id: model.id,
            actor: UserId::new(model.actor),
            action: model.action,
            meta: model.meta,
            created_at: model.created_at,
        }
    }
}
