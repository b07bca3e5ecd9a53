//! JSON body extractor whose rejection uses the [`AppError`] envelope.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// Like [`axum::Json`], but malformed bodies are rendered as
/// `{status: "error", code, error: "INVALID_JSON", message}` with the status
/// axum picked (400, 415 or 422).
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::AppJson;
///
/// async fn insert(AppJson(body): AppJson<InsertRequest>) -> impl IntoResponse {
///     // ...
/// }
/// ```
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(data))
    }
}
