//! Synchronous auth event dispatch
//!
//! The auth service publishes [`portal_core::AuthEvent`]s on the [`EventBus`];
//! every subscribed handler runs in order inside the request that raised the
//! event, and the first handler error is returned to that request.

mod audit;
mod bus;

pub use audit::AuditLogger;
pub use bus::{AuthEventHandler, EventBus};
