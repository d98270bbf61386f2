//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in portal-core.

mod audit_log;
mod error;
mod profile;
mod user;

pub use audit_log::PgAuditLogRepository;
pub use profile::PgProfileRepository;
pub use user::PgUserRepository;
