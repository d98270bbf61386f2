//! Admin site registration
//!
//! Entities are registered with the capabilities the admin pages may use.
//! Web routes consult the registry before serving a page.

mod site;

pub use site::{AdminDisplay, AdminSite, Capabilities, EntityKind, Fieldset, ModelAdmin};
