//! Authentication events
//!
//! Published by the auth service after a successful login or logout and
//! consumed synchronously by subscribers such as the audit logger.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::User;

/// What happened to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    LoggedIn,
    LoggedOut,
}

impl AuthEventKind {
    /// Message recorded in the audit log
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoggedIn => "User logged in",
            Self::LoggedOut => "User logged out",
        }
    }
}

/// A login or logout performed by `actor`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthEvent {
    pub actor: User,
    pub kind: AuthEventKind,
    pub timestamp: DateTime<Utc>,
}

impl AuthEvent {
    pub fn logged_in(actor: User) -> Self {
        Self::now(actor, AuthEventKind::LoggedIn)
    }

    pub fn logged_out(actor: User) -> Self {
        Self::now(actor, AuthEventKind::LoggedOut)
    }

    fn now(actor: User, kind: AuthEventKind) -> Self {
        Self {
            actor,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Event type name, as used in logs
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            AuthEventKind::LoggedIn => "USER_LOGGED_IN",
            AuthEventKind::LoggedOut => "USER_LOGGED_OUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::UserId;

    #[test]
    fn test_event_constructors() {
        let user = User {
            id: UserId::new(1),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: Utc::now(),
        };

        let login = AuthEvent::logged_in(user.clone());
        assert_eq!(login.kind.message(), "User logged in");
        assert_eq!(login.event_type(), "USER_LOGGED_IN");

        let logout = AuthEvent::logged_out(user);
        assert_eq!(logout.kind.message(), "User logged out");
        assert_eq!(logout.event_type(), "USER_LOGGED_OUT");
        assert!(logout.timestamp >= login.timestamp);
    }
}
