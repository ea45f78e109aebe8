use axum::{
    Form,
    extract::{FromRequest, Request, rejection::FormRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A `Form<T>` wrapper that turns malformed or incomplete submissions into
/// `AppError::Validation`, redirecting back to the page that was submitted.
///
/// Like `Form`, it reads the query string for GET requests and the
/// urlencoded body otherwise.
pub struct AppForm<T>(pub T);

impl<S, T> FromRequest<S> for AppForm<T>
where
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_owned();
        let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected form submission: {}", e.body_text());
            AppError::validation("Please fill in all required fields.", path)
        })?;
        Ok(AppForm(value))
    }
}
