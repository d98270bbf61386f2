use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use portal_core::{ActionFlag, AuditLogRepository, AuthEvent, DomainError, NewLogEntry};

use super::AuthEventHandler;

/// Writes one `Addition` log entry per login or logout, attributed to the user
#[derive(Clone)]
pub struct AuditLogger {
    log: Arc<dyn AuditLogRepository>,
}

impl AuditLogger {
    pub fn new(log: Arc<dyn AuditLogRepository>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl AuthEventHandler for AuditLogger {
    fn name(&self) -> &'static str {
        "audit_logger"
    }

    async fn handle(&self, event: &AuthEvent) -> Result<(), DomainError> {
        let entry = NewLogEntry::for_user(
            &event.actor,
            &event.actor,
            ActionFlag::Addition,
            event.kind.message(),
        );
        let stored = self.log.append(&entry).await?;

        info!(
            user_id = %event.actor.id,
            log_entry_id = %stored.id,
            message = %stored.change_message,
            "Audit entry recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{NewUser, UserRepository};
    use portal_db::MemoryDatabase;

    #[tokio::test]
    async fn test_login_and_logout_are_logged() {
        let db = MemoryDatabase::new();
        let user = db
            .create(&NewUser::new("testuser", "test@example.com"), "hash")
            .await
            .unwrap();
        let logger = AuditLogger::new(Arc::new(db.clone()));

        logger.handle(&AuthEvent::logged_in(user.clone())).await.unwrap();
        logger.handle(&AuthEvent::logged_out(user.clone())).await.unwrap();

        let entries = db.recent(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].change_message, "User logged out");
        assert_eq!(entries[1].change_message, "User logged in");
        for entry in &entries {
            assert_eq!(entry.action_flag, ActionFlag::Addition);
            assert_eq!(entry.user_id, user.id);
            assert_eq!(entry.content_type, "user");
            assert_eq!(entry.object_id.as_deref(), Some(user.id.to_string().as_str()));
            assert_eq!(entry.object_repr, "testuser (test@example.com)");
        }
    }
}
