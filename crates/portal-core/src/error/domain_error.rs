use thiserror::Error;

use crate::value_objects::{GeoPointError, ProfileId, UserId};

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    #[error("Profile not found for user {0}")]
    ProfileNotFoundForUser(UserId),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeoPointError),

    /// Shown verbatim as the 403 body
    #[error("You are not allowed to edit this profile.")]
    NotProfileOwner,

    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Username already in use")]
    UsernameAlreadyExists,

    // Wrapped infrastructure failures
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Stable code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ProfileNotFound(_) | Self::ProfileNotFoundForUser(_) => "UNKNOWN_PROFILE",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::InvalidGeometry(_) => "INVALID_GEOMETRY",
            Self::NotProfileOwner => "NOT_PROFILE_OWNER",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::ProfileNotFound(_) | Self::ProfileNotFoundForUser(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail | Self::InvalidUsername(_) | Self::InvalidGeometry(_)
        )
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotProfileOwner)
    }

    /// Unique-constraint style failures
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EmailAlreadyExists | Self::UsernameAlreadyExists)
    }
}
