//! Domain events

mod auth_event;

pub use auth_event::{AuthEvent, AuthEventKind};
