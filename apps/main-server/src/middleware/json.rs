//! JSON body extractor with the shared error envelope.

use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::ServerError;

/// Like [`axum::Json`], but a malformed or mistyped body is reported as
/// [`ServerError::InvalidRequest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServerError::InvalidRequest(rejection.body_text())),
        }
    }
}
