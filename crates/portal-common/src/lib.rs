//! # portal-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    decode_uid, encode_uid, hash_password, is_password_usable, make_unusable_password,
    password_problems, validate_password_strength, verify_password, PasswordResetTokens,
    PasswordService, ResetClaims, TokenType,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, MailBackend, MailConfig,
    RedisConfig, SecurityConfig, ServerConfig, SessionBackend, SessionConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{TracingConfig, TracingError};
