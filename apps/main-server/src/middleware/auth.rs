//! Authentication middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use concert_store::ConcertStore;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

/// Authenticated user information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
}

/// Extracts the bearer token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// Validates the bearer token and stores the [`AuthenticatedUser`] in the
/// request extensions. Requests without a valid token are answered with
/// `401` before any handler runs.
pub async fn auth_middleware<S: ConcertStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return ServerError::AuthenticationRequired.into_response();
    };

    let user_id = match state.jwt_manager.validate_session(token) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            return ServerError::Auth(e).into_response();
        }
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { id: user_id });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request as HttpRequest};

    use super::*;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/api/v1/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_valid() {
        let request = request_with(Some("Bearer test-token-123"));
        assert_eq!(extract_token(&request), Some("test-token-123"));
    }

    #[test]
    fn test_extract_token_missing_bearer() {
        let request = request_with(Some("Basic credentials"));
        assert_eq!(extract_token(&request), None);
    }

    #[test]
    fn test_extract_token_empty() {
        assert_eq!(extract_token(&request_with(Some("Bearer "))), None);
        assert_eq!(extract_token(&request_with(None)), None);
    }
}
