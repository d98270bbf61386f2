//! Application error type shared by the service and web layers

use portal_core::DomainError;

/// Errors crossing crate boundaries, each with an HTTP status and a stable code
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username or password is incorrect. Please try again.")]
    InvalidCredentials,

    /// Reset link whose uid or token does not verify
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidToken | Self::TokenExpired => 400,
            Self::InvalidCredentials => 401,
            Self::InsufficientPermissions => 403,
            Self::NotFound(_) => 404,
            Self::Domain(e) => Self::status_for_domain(e),
            Self::Database(_)
            | Self::Cache(_)
            | Self::Mail(_)
            | Self::Template(_)
            | Self::Config(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Status for a domain error, by its classification
    #[must_use]
    pub fn status_for_domain(e: &DomainError) -> u16 {
        match e {
            e if e.is_not_found() => 404,
            e if e.is_authorization() => 403,
            e if e.is_validation() => 400,
            e if e.is_conflict() => 409,
            _ => 500,
        }
    }

    /// Stable code used in log fields
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Mail(_) => "MAIL_ERROR",
            Self::Template(_) => "TEMPLATE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
