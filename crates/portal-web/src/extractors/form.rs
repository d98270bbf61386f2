//! Form body extractor

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;

use crate::response::WebError;

/// `application/x-www-form-urlencoded` body
///
/// Field validation happens in the form's own `clean`; this only rejects
/// bodies that cannot be decoded at all.
#[derive(Debug, Clone)]
pub struct HtmlForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for HtmlForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e: FormRejection| WebError::InvalidForm(e.body_text()))?;

        Ok(HtmlForm(value))
    }
}
