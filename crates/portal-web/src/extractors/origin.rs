//! Public origin extractor

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{headers::Host, TypedHeader};

use crate::response::WebError;
use crate::state::AppState;

/// Origin used for absolute links in outgoing mail
///
/// The configured public base URL wins; otherwise the request's `Host` header
/// is used over plain http.
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BaseUrl
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        if let Some(base_url) = &app_state.config().app.base_url {
            return Ok(Self(base_url.clone()));
        }

        let host = TypedHeader::<Host>::from_request_parts(parts, state)
            .await
            .map(|TypedHeader(host)| host.to_string())
            .unwrap_or_else(|_| {
                tracing::warn!("No Host header; invitation links fall back to localhost");
                "localhost".to_string()
            });

        Ok(Self(format!("http://{host}")))
    }
}
