//! Axum extractors for request handling
//!
//! Session-based identity, capability checks, form bodies and the public origin.

mod form;
mod origin;
mod session;

pub use form::HtmlForm;
pub use origin::BaseUrl;
pub use session::{CurrentUser, RequireLogin, RequireStaff, SessionKey};
