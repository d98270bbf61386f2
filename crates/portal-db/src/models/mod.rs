//! Database models - SQLx-compatible structs for PostgreSQL tables

mod log_entry;
mod profile;
mod user;

pub use log_entry::LogEntryModel;
pub use profile::{ProfileModel, ProfileWithOwnerModel};
pub use user::UserModel;
