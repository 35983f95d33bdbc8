//! Server error types.

use api_protocol::{ErrorBody, error_codes};
use auth::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use concert_store::ConcertStoreError;
use entities::ShowDateError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Login failed. The message does not reveal which credential was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The request conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A band or venue cannot be deleted while shows reference it.
    #[error("{message}")]
    InUse { message: String, shows_count: u64 },

    /// Endpoint exists but has no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(ConcertStoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConcertStoreError> for ServerError {
    fn from(err: ConcertStoreError) -> Self {
        match err {
            ConcertStoreError::NotFound { entity_type, .. } => {
                ServerError::NotFound(format!("{entity_type} not found"))
            }
            ConcertStoreError::AlreadyExists { entity_type, .. } => {
                ServerError::Conflict(format!("{entity_type} already exists"))
            }
            ConcertStoreError::ForeignKeyViolation(detail) => {
                ServerError::Conflict(format!("Referenced record is missing or in use: {detail}"))
            }
            other => ServerError::Database(other),
        }
    }
}

impl From<ShowDateError> for ServerError {
    fn from(err: ShowDateError) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(error_codes::INVALID_REQUEST, msg.clone()),
            ),
            ServerError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(error_codes::RESOURCE_NOT_FOUND, msg.clone()),
            ),
            ServerError::AuthenticationRequired | ServerError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new(error_codes::AUTHENTICATION_REQUIRED, self.to_string()),
            ),
            ServerError::PermissionDenied(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody::new(error_codes::PERMISSION_DENIED, msg.clone()),
            ),
            ServerError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody::new(error_codes::CONFLICT, msg.clone()),
            ),
            ServerError::InUse {
                message,
                shows_count,
            } => (
                StatusCode::CONFLICT,
                ErrorBody::new(error_codes::CONFLICT, message.clone())
                    .with_shows_count(*shows_count),
            ),
            ServerError::NotImplemented(msg) => (
                StatusCode::NOT_IMPLEMENTED,
                ErrorBody::new(error_codes::NOT_IMPLEMENTED, msg.clone()),
            ),
            ServerError::Auth(AuthError::PasswordHash(_) | AuthError::JwtEncoding(_))
            | ServerError::Database(_)
            | ServerError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(error_codes::INTERNAL_ERROR, INTERNAL_MESSAGE),
                )
            }
            ServerError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new(
                    error_codes::AUTHENTICATION_REQUIRED,
                    ServerError::InvalidCredentials.to_string(),
                ),
            ),
            ServerError::Auth(e) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new(error_codes::AUTHENTICATION_REQUIRED, e.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
