//! Log entry entity <-> model mapper

use portal_core::{ActionFlag, DomainError, LogEntry, LogEntryId, UserId};

use crate::models::LogEntryModel;

impl TryFrom<LogEntryModel> for LogEntry {
    type Error = DomainError;

    fn try_from(model: LogEntryModel) -> Result<Self, Self::Error> {
        let action_flag = ActionFlag::from_i16(model.action_flag).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown action flag {}", model.action_flag))
        })?;

        Ok(LogEntry {
            id: LogEntryId::new(model.id),
            action_time: model.action_time,
            user_id: UserId::new(model.user_id),
            content_type: model.content_type,
            object_id: model.object_id,
            object_repr: model.object_repr,
            action_flag,
            change_message: model.change_message,
        })
    }
}
