//! Registration and login endpoints.

use std::sync::Arc;

use api_protocol::{AuthResponse, LoginRequest, RegisterRequest};
use axum::{Json, extract::State, http::StatusCode};
use concert_store::ConcertStore;

use crate::error::ServerResult;
use crate::middleware::ValidJson;
use crate::services::account;
use crate::state::AppState;

/// Registers a new user.
pub async fn register<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> ServerResult<(StatusCode, Json<AuthResponse>)> {
    let response = account::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Logs a user in.
pub async fn login<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ServerResult<Json<AuthResponse>> {
    Ok(Json(account::login(&state, request).await?))
}
