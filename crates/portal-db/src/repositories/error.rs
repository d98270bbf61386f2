//! Error handling utilities for repositories

use portal_core::{DomainError, ProfileId, UserId};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Map a unique violation on the users table to the clashing column
pub fn user_conflict(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some(name) if name.contains("email") => DomainError::EmailAlreadyExists,
        _ => DomainError::UsernameAlreadyExists,
    }
}

/// Map a foreign-key violation to a missing owner
pub fn map_missing_user(e: SqlxError, user_id: UserId) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return DomainError::UserNotFound(user_id);
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "user not found" error
pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::UserNotFound(id)
}

/// Create a "profile not found" error
pub fn profile_not_found(id: ProfileId) -> DomainError {
    DomainError::ProfileNotFound(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_conflict_by_constraint() {
        assert!(matches!(
            user_conflict(Some("users_email_key")),
            DomainError::EmailAlreadyExists
        ));
        assert!(matches!(
            user_conflict(Some("users_username_key")),
            DomainError::UsernameAlreadyExists
        ));
        assert!(matches!(user_conflict(None), DomainError::UsernameAlreadyExists));
    }

    #[test]
    fn test_non_database_errors_fall_through() {
        let err = map_unique_violation(SqlxError::RowNotFound, |_| DomainError::EmailAlreadyExists);
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
