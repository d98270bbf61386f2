//! Admin log entry - append-only record of actions taken on accounts

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::User;
use crate::value_objects::{LogEntryId, UserId};

/// Content type recorded for entries about user accounts
pub const USER_CONTENT_TYPE: &str = "user";

const OBJECT_REPR_MAX_LENGTH: usize = 200;

/// Kind of action a log entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFlag {
    Addition,
    Change,
    Deletion,
}

impl ActionFlag {
    /// Stored numeric value
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Addition => 1,
            Self::Change => 2,
            Self::Deletion => 3,
        }
    }

    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Addition),
            2 => Some(Self::Change),
            3 => Some(Self::Deletion),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Addition => "Addition",
            Self::Change => "Change",
            Self::Deletion => "Deletion",
        }
    }
}

/// A stored admin log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub action_time: DateTime<Utc>,
    pub user_id: UserId,
    pub content_type: String,
    pub object_id: Option<String>,
    pub object_repr: String,
    pub action_flag: ActionFlag,
    pub change_message: String,
}

/// An entry waiting to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub user_id: UserId,
    pub content_type: String,
    pub object_id: Option<String>,
    pub object_repr: String,
    pub action_flag: ActionFlag,
    pub change_message: String,
}

impl NewLogEntry {
    /// Entry performed by `actor` on the account `subject`
    pub fn for_user(
        actor: &User,
        subject: &User,
        action_flag: ActionFlag,
        change_message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: actor.id,
            content_type: USER_CONTENT_TYPE.to_string(),
            object_id: Some(subject.id.to_string()),
            object_repr: subject
                .display_repr()
                .chars()
                .take(OBJECT_REPR_MAX_LENGTH)
                .collect(),
            action_flag,
            change_message: change_message.into(),
        }
    }
}
