//! Route handlers
//!
//! Page handlers organized by area.

pub mod admin;
pub mod auth;
pub mod health;
pub mod map;
pub mod profile;
