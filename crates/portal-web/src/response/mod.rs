//! Response types and error handling for the HTML pages
//!
//! Errors become plain responses: a redirect to the login page, a `403` or
//! `404` text body, or a logged `500`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use portal_common::AppError;
use portal_service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Login page path
pub const LOGIN_URL: &str = "/login/";

/// Where a successful login lands when no `next` is given
pub const LOGIN_REDIRECT_URL: &str = "/profile/";

/// Web error type
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    App(#[from] AppError),

    /// Anonymous request for a page that needs a login; `next` is the
    /// path and query to come back to
    #[error("Login required")]
    LoginRequired { next: String },

    #[error("{0}")]
    Forbidden(String),

    #[error("Not Found")]
    NotFound,

    #[error("Invalid form submission: {0}")]
    InvalidForm(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl WebError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let from_u16 =
            |code: u16| StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self {
            Self::Service(e) => from_u16(e.status_code()),
            Self::App(e) => from_u16(e.status_code()),
            Self::LoginRequired { .. } => StatusCode::FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn login_required(next: impl Into<String>) -> Self {
        Self::LoginRequired { next: next.into() }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if let Self::LoginRequired { next } = &self {
            return Found(login_url(next)).into_response();
        }

        let status = self.status_code();
        let body = match &self {
            Self::Service(ServiceError::PermissionDenied(message)) | Self::Forbidden(message) => {
                message.clone()
            }
            _ if status == StatusCode::NOT_FOUND => "Not Found".to_string(),
            _ if status.is_server_error() => {
                error!(error = ?self, "Server error occurred");
                "Internal Server Error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Type alias for page results
pub type WebResult<T> = Result<T, WebError>;

/// `302 Found` redirect
#[derive(Debug, Clone)]
pub struct Found(pub String);

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

/// `/login/?next=<path>` with the path quoted the way browsers expect
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", quote(next))
}

/// Everything but unreserved characters and `/` gets percent-encoded
const NEXT_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

fn quote(value: &str) -> String {
    utf8_percent_encode(value, NEXT_PATH).to_string()
}

/// Keep `next` only when it is a local absolute path
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => LOGIN_REDIRECT_URL.to_string(),
    }
}
