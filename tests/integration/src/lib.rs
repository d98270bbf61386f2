//! Integration test utilities for the user portal
//!
//! Spawns the portal on an ephemeral port over in-memory stores and drives it
//! with a cookie-keeping HTTP client, the way a browser would.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
