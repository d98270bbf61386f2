//! Session extractors
//!
//! The session key travels in a cookie; the account behind it is looked up in
//! the session store on every request.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use portal_core::User;
use portal_service::AuthService;

use crate::response::{WebError, LOGIN_URL};
use crate::state::AppState;

/// Raw session key from the cookie, if any
#[derive(Debug, Clone)]
pub struct SessionKey(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let key = jar
            .get(app_state.session_cookie_name())
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());
        Ok(Self(key))
    }
}

/// Account of the current session; `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(Self(Some(user.clone())));
        }

        let SessionKey(key) = SessionKey::from_request_parts(parts, state).await?;
        let Some(key) = key else {
            return Ok(Self(None));
        };

        let app_state = AppState::from_ref(state);
        let user = AuthService::new(app_state.service_context())
            .session_user(&key)
            .await?;

        if let Some(user) = &user {
            parts.extensions.insert(user.clone());
        }
        Ok(Self(user))
    }
}

/// Logged-in account; anonymous requests are redirected to the login page
#[derive(Debug, Clone)]
pub struct RequireLogin(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) => Ok(Self(user)),
            CurrentUser(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or(LOGIN_URL, |pq| pq.as_str());
                Err(WebError::login_required(next))
            }
        }
    }
}

/// Logged-in staff account, for the admin pages
#[derive(Debug, Clone)]
pub struct RequireStaff(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireLogin(user) = RequireLogin::from_request_parts(parts, state).await?;
        if user.can_access_admin() {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = %user.id, "Non-staff account denied admin access");
            Err(WebError::Forbidden(
                "You do not have permission to access the admin site.".to_string(),
            ))
        }
    }
}
