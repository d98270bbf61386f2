//! Admin log entry database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the admin_log_entries table
#[derive(Debug, Clone, FromRow)]
pub struct LogEntryModel {
    pub id: i64,
    pub action_time: DateTime<Utc>,
    pub user_id: i64,
    pub content_type: String,
    pub object_id: Option<String>,
    pub object_repr: String,
    /// 1 = addition, 2 = change, 3 = deletion
    pub action_flag: i16,
    pub change_message: String,
}
