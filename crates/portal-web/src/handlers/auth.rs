//! Authentication handlers
//!
//! Login, logout and the password reset confirmation page that invitation
//! links point at.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use minijinja::context;
use portal_common::{AppConfig, AppError};
use portal_core::User;
use portal_service::{AuthService, FormErrors, LoginForm, ServiceError, SetPasswordForm};
use serde::Deserialize;

use crate::extractors::{CurrentUser, HtmlForm, SessionKey};
use crate::response::{safe_next, Found, WebResult, LOGIN_URL};
use crate::state::AppState;

/// Shown when the credentials do not match an active account
pub const LOGIN_FAILED: &str = "Username or password is incorrect. Please try again.";

/// Shown after a reset link has been used to set a password
pub const PASSWORD_SET: &str = "Your password has been set. You can now log in.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPath {
    pub uidb64: String,
    pub token: String,
}

fn session_cookie(config: &AppConfig, key: String) -> Cookie<'static> {
    Cookie::build((config.session.cookie_name.clone(), key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.session.cookie_secure)
        .build()
}

fn render_login(
    state: &AppState,
    username: &str,
    next: Option<&str>,
    error: Option<&str>,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    state.templates().render(
        "login.html",
        context! {
            username => username,
            next => next,
            error => error,
            errors => errors,
        },
    )
}

/// Login form
///
/// GET /login/
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> WebResult<Html<String>> {
    render_login(&state, "", query.next.as_deref(), None, &FormErrors::new())
}

/// Check credentials and open a session
///
/// POST /login/
pub async fn login(
    State(state): State<AppState>,
    SessionKey(previous): SessionKey,
    jar: CookieJar,
    HtmlForm(form): HtmlForm<LoginForm>,
) -> WebResult<Response> {
    let username = form.username.clone();
    let next = form.next.clone();

    let form = match form.clean() {
        Ok(form) => form,
        Err(errors) => {
            return Ok(render_login(&state, &username, next.as_deref(), None, &errors)?.into_response());
        }
    };

    let ctx = state.service_context();
    match AuthService::new(ctx).login(&form).await {
        Ok(outcome) => {
            if let Some(previous) = previous {
                ctx.session_store()
                    .destroy(&previous)
                    .await
                    .map_err(ServiceError::from)?;
            }
            let jar = jar.add(session_cookie(state.config(), outcome.session.key));
            Ok((jar, Found(safe_next(next.as_deref()))).into_response())
        }
        Err(ServiceError::App(AppError::InvalidCredentials)) => Ok(render_login(
            &state,
            &form.username,
            next.as_deref(),
            Some(LOGIN_FAILED),
            &FormErrors::new(),
        )?
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Destroy the session and clear the cookie
///
/// POST /logout/
pub async fn logout(
    State(state): State<AppState>,
    SessionKey(key): SessionKey,
    jar: CookieJar,
) -> WebResult<(CookieJar, Found)> {
    AuthService::new(state.service_context())
        .logout(key.as_deref())
        .await?;

    let jar = jar.remove(Cookie::build((state.session_cookie_name().to_string(), "")).path("/"));
    Ok((jar, Found(LOGIN_URL.to_string())))
}

fn render_reset_form(
    state: &AppState,
    user: Option<&User>,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    state.templates().render(
        "registration/reset_confirm.html",
        context! { user => user, errors => errors },
    )
}

fn render_reset_invalid(state: &AppState, user: Option<&User>) -> WebResult<Html<String>> {
    state
        .templates()
        .render("registration/reset_invalid.html", context! { user => user })
}

/// Password form behind a reset link
///
/// GET /reset/:uidb64/:token/
pub async fn reset_page(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(path): Path<ResetPath>,
) -> WebResult<Html<String>> {
    let auth = AuthService::new(state.service_context());
    match auth.check_reset_link(&path.uidb64, &path.token).await? {
        Some(_) => render_reset_form(&state, viewer.as_ref(), &FormErrors::new()),
        None => render_reset_invalid(&state, viewer.as_ref()),
    }
}

/// Set the password through a reset link
///
/// POST /reset/:uidb64/:token/
pub async fn reset_confirm(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(path): Path<ResetPath>,
    HtmlForm(form): HtmlForm<SetPasswordForm>,
) -> WebResult<Html<String>> {
    let auth = AuthService::new(state.service_context());
    let Some(account) = auth.check_reset_link(&path.uidb64, &path.token).await? else {
        return render_reset_invalid(&state, viewer.as_ref());
    };

    match auth.confirm_password_reset(&account, &form).await {
        Ok(()) => state.templates().render(
            "registration/reset_complete.html",
            context! { user => viewer, message => PASSWORD_SET },
        ),
        Err(ServiceError::Form(errors)) => render_reset_form(&state, viewer.as_ref(), &errors),
        Err(e) => Err(e.into()),
    }
}
