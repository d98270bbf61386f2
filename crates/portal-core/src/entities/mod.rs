//! Domain entities - core business objects

mod log_entry;
mod profile;
mod session;
mod user;

pub use log_entry::{ActionFlag, LogEntry, NewLogEntry, USER_CONTENT_TYPE};
pub use profile::{ProfileChanges, ProfileWithOwner, UserProfile, PHONE_NUMBER_MAX_LENGTH};
pub use session::SessionRecord;
pub use user::{is_valid_username, normalize_email, NewUser, User, USERNAME_MAX_LENGTH};
