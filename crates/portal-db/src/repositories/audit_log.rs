//! PostgreSQL implementation of AuditLogRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use portal_core::{AuditLogRepository, LogEntry, NewLogEntry, RepoResult};

use crate::models::LogEntryModel;

use super::error::{map_db_error, map_missing_user};

/// PostgreSQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new PgAuditLogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self), fields(user_id = %entry.user_id, flag = entry.action_flag.label()))]
    async fn append(&self, entry: &NewLogEntry) -> RepoResult<LogEntry> {
        let model = sqlx::query_as::<_, LogEntryModel>(
            r"
            INSERT INTO admin_log_entries (user_id, content_type, object_id, object_repr,
                                           action_flag, change_message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, action_time, user_id, content_type, object_id, object_repr,
                      action_flag, change_message
            ",
        )
        .bind(entry.user_id.into_inner())
        .bind(&entry.content_type)
        .bind(&entry.object_id)
        .bind(&entry.object_repr)
        .bind(entry.action_flag.as_i16())
        .bind(&entry.change_message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_missing_user(e, entry.user_id))?;

        LogEntry::try_from(model)
    }

    #[instrument(skip(self))]
    async fn recent(&self, limit: i64) -> RepoResult<Vec<LogEntry>> {
        let rows = sqlx::query_as::<_, LogEntryModel>(
            r"
            SELECT id, action_time, user_id, content_type, object_id, object_repr,
                   action_flag, change_message
            FROM admin_log_entries
            ORDER BY action_time DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(LogEntry::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn for_object(&self, content_type: &str, object_id: &str) -> RepoResult<Vec<LogEntry>> {
        let rows = sqlx::query_as::<_, LogEntryModel>(
            r"
            SELECT id, action_time, user_id, content_type, object_id, object_repr,
                   action_flag, change_message
            FROM admin_log_entries
            WHERE content_type = $1 AND object_id = $2
            ORDER BY action_time DESC, id DESC
            ",
        )
        .bind(content_type)
        .bind(object_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(LogEntry::try_from).collect()
    }
}
