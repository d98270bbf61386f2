//! # portal-web
//!
//! HTML front end and admin pages served with Axum.

pub mod cli;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use server::{
    create_app, create_app_state, create_memory_app_state, create_superuser, migrate, run, serve,
};
pub use state::AppState;
