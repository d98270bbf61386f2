//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    /// Absolute origin used in emailed links, e.g. `https://portal.example.com`.
    /// When unset, links are built from the request's `Host` header.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Read `APP_ENV`, falling back to development
    #[must_use]
    pub fn from_env() -> Self {
        env::var("APP_ENV")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Where login sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for SessionBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue("SESSION_BACKEND", other.to_string())),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Server-side session lifetime in seconds
    #[serde(default = "default_cookie_age")]
    pub cookie_age: i64,
    #[serde(default)]
    pub cookie_secure: bool,
}

/// Signing secrets
#[derive(Clone, Deserialize)]
pub struct SecurityConfig {
    pub secret_key: String,
    /// Lifetime of password-reset links in seconds
    #[serde(default = "default_password_reset_timeout")]
    pub password_reset_timeout: i64,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("password_reset_timeout", &self.password_reset_timeout)
            .finish_non_exhaustive()
    }
}

/// How outgoing mail is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Smtp,
    #[default]
    Console,
}

impl FromStr for MailBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "console" => Ok(Self::Console),
            other => Err(ConfigError::InvalidValue("EMAIL_BACKEND", other.to_string())),
        }
    }
}

/// Outgoing mail configuration
#[derive(Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub backend: MailBackend,
    #[serde(default = "default_mail_host")]
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_true")]
    pub use_tls: bool,
    /// Sender address of invitation mails
    pub from_address: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("use_tls", &self.use_tls)
            .field("from_address", &self.from_address)
            .finish_non_exhaustive()
    }
}

// Default value functions
fn default_app_name() -> String {
    "user-portal".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_migrations_dir() -> String {
    "./migrations".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_cookie_name() -> String {
    "sessionid".to_string()
}

fn default_cookie_age() -> i64 {
    1_209_600 // 2 weeks
}

fn default_password_reset_timeout() -> i64 {
    259_200 // 3 days
}

fn default_mail_host() -> String {
    "localhost".to_string()
}

fn default_mail_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "webmaster@localhost".to_string()
}

fn default_true() -> bool {
    true
}

/// Parse an optional variable, failing on values that do not parse
fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        None => Ok(default()),
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(name).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue(name, v)),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let session_backend: SessionBackend = parsed(&lookup, "SESSION_BACKEND", SessionBackend::default)?;
        let mail_backend: MailBackend = parsed(&lookup, "EMAIL_BACKEND", MailBackend::default)?;

        let redis = match lookup("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parsed(
                    &lookup,
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections,
                )?,
            }),
            None if session_backend == SessionBackend::Redis => {
                return Err(ConfigError::MissingVar("REDIS_URL"));
            }
            None => None,
        };

        let mail_username = lookup("EMAIL_HOST_USER").filter(|v| !v.is_empty());
        let mail_host = match mail_backend {
            MailBackend::Smtp => required(&lookup, "EMAIL_HOST")?,
            MailBackend::Console => lookup("EMAIL_HOST").unwrap_or_else(default_mail_host),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: parsed(&lookup, "APP_ENV", default_env)?,
                base_url: lookup("PUBLIC_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .filter(|url| !url.is_empty()),
            },
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(default_host),
                port: parsed(&lookup, "SERVER_PORT", default_port)?,
                request_timeout_secs: parsed(
                    &lookup,
                    "REQUEST_TIMEOUT_SECS",
                    default_request_timeout,
                )?,
            },
            database: DatabaseConfig {
                url: required(&lookup, "DATABASE_URL")?,
                max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parsed(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                migrations_dir: lookup("MIGRATIONS_DIR").unwrap_or_else(default_migrations_dir),
            },
            redis,
            session: SessionConfig {
                backend: session_backend,
                cookie_name: lookup("SESSION_COOKIE_NAME").unwrap_or_else(default_cookie_name),
                cookie_age: parsed(&lookup, "SESSION_COOKIE_AGE", default_cookie_age)?,
                cookie_secure: flag(&lookup, "SESSION_COOKIE_SECURE", false)?,
            },
            security: SecurityConfig {
                secret_key: required(&lookup, "SECRET_KEY")?,
                password_reset_timeout: parsed(
                    &lookup,
                    "PASSWORD_RESET_TIMEOUT",
                    default_password_reset_timeout,
                )?,
            },
            mail: MailConfig {
                backend: mail_backend,
                host: mail_host,
                port: parsed(&lookup, "EMAIL_PORT", default_mail_port)?,
                password: lookup("EMAIL_HOST_PASSWORD").filter(|v| !v.is_empty()),
                use_tls: flag(&lookup, "EMAIL_USE_TLS", true)?,
                from_address: lookup("EMAIL_FROM")
                    .or_else(|| mail_username.clone())
                    .unwrap_or_else(default_from_address),
                username: mail_username,
            },
        })
    }

    /// In-process configuration: memory sessions, console mail, no base URL
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
                base_url: None,
            },
            server: ServerConfig {
                host: default_host(),
                port: 0,
                request_timeout_secs: default_request_timeout(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/portal_test".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                migrations_dir: default_migrations_dir(),
            },
            redis: None,
            session: SessionConfig {
                backend: SessionBackend::Memory,
                cookie_name: default_cookie_name(),
                cookie_age: default_cookie_age(),
                cookie_secure: false,
            },
            security: SecurityConfig {
                secret_key: "test-secret-key-that-is-long-enough".to_string(),
                password_reset_timeout: default_password_reset_timeout(),
            },
            mail: MailConfig {
                backend: MailBackend::Console,
                host: default_mail_host(),
                port: default_mail_port(),
                username: None,
                password: None,
                use_tls: false,
                from_address: "noreply@example.com".to_string(),
            },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
