//! Admin handlers
//!
//! Change lists and user forms driven by the registrations in the admin site.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Value};
use portal_core::{LogEntry, User, UserId};
use portal_service::dto::{FormField, FormSection};
use portal_service::{
    AdminService, AdminUserChangeForm, AdminUserCreateForm, Capabilities, EntityKind, Fieldset,
    FormErrors, ServiceError,
};
use serde::Serialize;
use tracing::info;

use crate::extractors::{BaseUrl, HtmlForm, RequireStaff};
use crate::response::{Found, WebError, WebResult};
use crate::state::AppState;

const USERS_URL: &str = "/admin/users/";
const RECENT_ACTIONS_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
struct EntityLink {
    slug: &'static str,
    name: &'static str,
}

/// Page context shared by the add and change user forms
#[derive(Debug, Serialize)]
struct UserFormPage<'a> {
    heading: &'static str,
    action: String,
    adding: bool,
    /// Saving the add form mails an invitation
    invites: bool,
    sections: Vec<FormSection>,
    non_field_errors: &'a [String],
    history: &'a [LogEntry],
}

/// Render an admin page with the navigation built from the registry
fn render_admin(
    state: &AppState,
    user: &User,
    name: &str,
    page: impl Serialize,
) -> WebResult<Html<String>> {
    let site = state.service_context().admin_site();
    let entities: Vec<EntityLink> = site
        .entities()
        .filter(|kind| site.allows(*kind, Capabilities::LIST))
        .map(|kind| EntityLink {
            slug: kind.slug(),
            name: kind.verbose_name_plural(),
        })
        .collect();

    state.templates().render(
        name,
        context! {
            user => user,
            entities => entities,
            geo => site.allows(EntityKind::UserProfile, Capabilities::GEO),
            ..Value::from_serialize(&page)
        },
    )
}

fn sections(
    fieldsets: &[Fieldset],
    form: &impl Serialize,
    errors: &FormErrors,
) -> WebResult<Vec<FormSection>> {
    let values = serde_json::to_value(form).map_err(WebError::internal)?;
    Ok(fieldsets
        .iter()
        .map(|fieldset| FormSection {
            title: fieldset.title,
            fields: fieldset
                .fields
                .iter()
                .copied()
                .map(|name| FormField::new(name, &values, errors))
                .collect(),
        })
        .collect())
}

fn parse_user_id(raw: &str) -> WebResult<UserId> {
    raw.parse().map_err(|_| WebError::NotFound)
}

/// GET /admin/
pub async fn index(RequireStaff(_): RequireStaff) -> Found {
    Found(USERS_URL.to_string())
}

/// GET /admin/users/
pub async fn users_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> WebResult<Html<String>> {
    let table = AdminService::new(state.service_context())
        .list_users(&user)
        .await?;
    render_admin(
        &state,
        &user,
        "admin/list.html",
        context! { table => table, slug => EntityKind::User.slug() },
    )
}

/// GET /admin/profiles/
pub async fn profiles_list(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> WebResult<Html<String>> {
    let table = AdminService::new(state.service_context())
        .list_profiles(&user)
        .await?;
    render_admin(
        &state,
        &user,
        "admin/list.html",
        context! { table => table, slug => EntityKind::UserProfile.slug() },
    )
}

fn render_add_form(
    state: &AppState,
    user: &User,
    form: &AdminUserCreateForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    let admin = AdminService::new(state.service_context())
        .model_admin(EntityKind::User, Capabilities::CREATE)?;
    let page = UserFormPage {
        heading: "Add user",
        action: format!("{USERS_URL}add/"),
        adding: true,
        invites: admin.allows(Capabilities::CREATE_HOOK),
        sections: sections(&admin.add_fieldsets, form, errors)?,
        non_field_errors: errors.non_field(),
        history: &[],
    };
    render_admin(state, user, "admin/user_form.html", page)
}

/// GET /admin/users/add/
pub async fn user_add_page(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> WebResult<Html<String>> {
    render_add_form(&state, &user, &AdminUserCreateForm::initial(), &FormErrors::new())
}

/// Create an account; with the invitation hook registered the new user is
/// mailed a link to set a password
///
/// POST /admin/users/add/
pub async fn user_add(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    BaseUrl(base_url): BaseUrl,
    HtmlForm(form): HtmlForm<AdminUserCreateForm>,
) -> WebResult<Response> {
    let service = AdminService::new(state.service_context());
    match service.create_user(&user, &form, &base_url).await {
        Ok(created) => {
            info!(
                actor_id = %user.id,
                user_id = %created.user.id,
                invited = created.invited,
                "Admin added user"
            );
            Ok(Found(USERS_URL.to_string()).into_response())
        }
        Err(ServiceError::Form(errors)) => {
            Ok(render_add_form(&state, &user, &form, &errors)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

fn render_change_form(
    state: &AppState,
    user: &User,
    id: UserId,
    form: &AdminUserChangeForm,
    errors: &FormErrors,
    history: &[LogEntry],
) -> WebResult<Html<String>> {
    let admin = AdminService::new(state.service_context())
        .model_admin(EntityKind::User, Capabilities::EDIT)?;
    let page = UserFormPage {
        heading: "Change user",
        action: format!("{USERS_URL}{id}/change/"),
        adding: false,
        invites: false,
        sections: sections(&admin.fieldsets, form, errors)?,
        non_field_errors: errors.non_field(),
        history,
    };
    render_admin(state, user, "admin/user_form.html", page)
}

/// GET /admin/users/:id/change/
pub async fn user_change_page(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let id = parse_user_id(&id)?;
    let service = AdminService::new(state.service_context());
    let subject = service.get_user(&user, id).await?;
    let history = service.user_history(&user, id).await?;

    render_change_form(
        &state,
        &user,
        id,
        &AdminUserChangeForm::from_user(&subject),
        &FormErrors::new(),
        &history,
    )
}

/// POST /admin/users/:id/change/
pub async fn user_change(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<String>,
    HtmlForm(form): HtmlForm<AdminUserChangeForm>,
) -> WebResult<Response> {
    let id = parse_user_id(&id)?;
    let service = AdminService::new(state.service_context());

    match service.update_user(&user, id, &form).await {
        Ok(_) => Ok(Found(USERS_URL.to_string()).into_response()),
        Err(ServiceError::Form(errors)) => {
            let history = service.user_history(&user, id).await?;
            Ok(render_change_form(&state, &user, id, &form, &errors, &history)?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /admin/log/
pub async fn log_page(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
) -> WebResult<Html<String>> {
    let entries = AdminService::new(state.service_context())
        .recent_actions(&user, RECENT_ACTIONS_LIMIT)
        .await?;
    render_admin(&state, &user, "admin/log.html", context! { entries => entries })
}
