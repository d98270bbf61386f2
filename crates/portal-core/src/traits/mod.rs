//! Repository and store traits (ports)

mod repositories;
mod session;

pub use repositories::{AuditLogRepository, ProfileRepository, RepoResult, UserRepository};
pub use session::SessionStore;
