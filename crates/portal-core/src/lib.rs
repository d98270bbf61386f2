//! # portal-core
//!
//! Domain layer containing entities, value objects, repository traits, and auth events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    is_valid_username, normalize_email, ActionFlag, LogEntry, NewLogEntry, NewUser,
    ProfileChanges, ProfileWithOwner, SessionRecord, User, UserProfile, PHONE_NUMBER_MAX_LENGTH,
    USERNAME_MAX_LENGTH, USER_CONTENT_TYPE,
};
pub use error::DomainError;
pub use events::{AuthEvent, AuthEventKind};
pub use traits::{
    AuditLogRepository, ProfileRepository, RepoResult, SessionStore, UserRepository,
};
pub use value_objects::{GeoPoint, GeoPointError, IdParseError, LogEntryId, ProfileId, UserId, SRID_WGS84};
