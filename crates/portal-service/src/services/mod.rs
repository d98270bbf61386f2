//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of one
//! request and orchestrates repositories, the session store, mail and events.

pub mod admin;
pub mod auth;
pub mod context;
pub mod error;
pub mod map;
pub mod profile;
pub mod user;

pub use admin::{AdminService, CreatedUser};
pub use auth::{AuthService, LoginOutcome};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use map::MapService;
pub use profile::ProfileService;
pub use user::UserService;
