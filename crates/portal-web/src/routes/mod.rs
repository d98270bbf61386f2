//! Route definitions

use axum::{routing::get, routing::post, Router};

use crate::handlers::{admin, auth, health, map, profile};
use crate::state::AppState;

/// Create the page router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::home))
        .merge(auth_routes())
        .merge(profile_routes())
        .route("/map/", get(map::map_page))
        .merge(admin_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", post(auth::logout))
        .route(
            "/reset/:uidb64/:token/",
            get(auth::reset_page).post(auth::reset_confirm),
        )
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/", get(profile::profile_page))
        .route(
            "/profile/edit/:id/",
            get(profile::edit_profile_page).post(profile::edit_profile),
        )
}

/// Admin pages
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/", get(admin::index))
        .route("/admin/users/", get(admin::users_list))
        .route("/admin/users/add/", get(admin::user_add_page).post(admin::user_add))
        .route(
            "/admin/users/:id/change/",
            get(admin::user_change_page).post(admin::user_change),
        )
        .route("/admin/profiles/", get(admin::profiles_list))
        .route("/admin/map/", get(map::admin_map_page))
        .route("/admin/log/", get(admin::log_page))
}
