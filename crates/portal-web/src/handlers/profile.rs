//! Profile handlers

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use portal_core::{GeoPoint, ProfileId, User};
use portal_service::{EditProfileForm, FormErrors, ProfileService, ServiceError};

use crate::extractors::{HtmlForm, RequireLogin};
use crate::response::{Found, WebError, WebResult, LOGIN_REDIRECT_URL};
use crate::state::AppState;

/// GET /
pub async fn home() -> Found {
    Found(LOGIN_REDIRECT_URL.to_string())
}

/// Own profile, created empty on first visit
///
/// GET /profile/
pub async fn profile_page(
    State(state): State<AppState>,
    RequireLogin(user): RequireLogin,
) -> WebResult<Html<String>> {
    let profile = ProfileService::new(state.service_context())
        .own_profile(&user)
        .await?;

    state.templates().render(
        "profile.html",
        context! {
            user => &user,
            profile => &profile,
            location => profile.location.as_ref().map(GeoPoint::to_wkt),
        },
    )
}

fn parse_profile_id(raw: &str) -> WebResult<ProfileId> {
    raw.parse().map_err(|_| WebError::NotFound)
}

fn render_edit(
    state: &AppState,
    user: &User,
    profile_id: ProfileId,
    form: &EditProfileForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    state.templates().render(
        "edit_profile.html",
        context! {
            user => user,
            profile_id => profile_id,
            form => form,
            errors => errors,
        },
    )
}

/// GET /profile/edit/:id/
pub async fn edit_profile_page(
    State(state): State<AppState>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let id = parse_profile_id(&id)?;
    let profile = ProfileService::new(state.service_context())
        .profile_for_edit(&user, id)
        .await?;

    render_edit(
        &state,
        &user,
        id,
        &EditProfileForm::from_profile(&profile),
        &FormErrors::new(),
    )
}

/// POST /profile/edit/:id/
pub async fn edit_profile(
    State(state): State<AppState>,
    RequireLogin(user): RequireLogin,
    Path(id): Path<String>,
    HtmlForm(form): HtmlForm<EditProfileForm>,
) -> WebResult<Response> {
    let id = parse_profile_id(&id)?;
    let service = ProfileService::new(state.service_context());

    match service.update_profile(&user, id, &form).await {
        Ok(_) => Ok(Found(LOGIN_REDIRECT_URL.to_string()).into_response()),
        Err(ServiceError::Form(errors)) => {
            Ok(render_edit(&state, &user, id, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
