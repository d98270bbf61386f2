//! Location map handlers

use axum::{extract::State, response::Html};
use minijinja::context;
use portal_core::User;
use portal_service::{Capabilities, EntityKind, MapService};

use crate::extractors::{RequireLogin, RequireStaff};
use crate::response::{WebError, WebResult};
use crate::state::AppState;

async fn render_map(state: &AppState, user: &User) -> WebResult<Html<String>> {
    let features = MapService::new(state.service_context())
        .feature_collection(user)
        .await?;

    state.templates().render(
        "map.html",
        context! { user => user, features => &features },
    )
}

/// Map of every located profile; superusers only
///
/// GET /map/
pub async fn map_page(
    State(state): State<AppState>,
    RequireLogin(user): RequireLogin,
) -> WebResult<Html<String>> {
    render_map(&state, &user).await
}

/// The same map under the admin, when profiles are registered as geo-enabled
///
/// GET /admin/map/
pub async fn admin_map_page(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> WebResult<Html<String>> {
    if !state
        .service_context()
        .admin_site()
        .allows(EntityKind::UserProfile, Capabilities::GEO)
    {
        return Err(WebError::NotFound);
    }
    render_map(&state, &user).await
}
