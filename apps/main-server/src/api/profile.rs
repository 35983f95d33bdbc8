//! Profile endpoints for the authenticated user.

use std::sync::Arc;

use api_protocol::{DeleteAccountRequest, MessageResponse, UpdateProfileRequest, UserProfile};
use axum::{Extension, Json, extract::State};
use concert_store::ConcertStore;

use crate::error::ServerResult;
use crate::middleware::{AuthenticatedUser, ValidJson};
use crate::services::account;
use crate::state::AppState;

/// Gets the caller's profile.
pub async fn get_profile<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<UserProfile>> {
    Ok(Json(account::get_profile(&state.store, user.id).await?))
}

/// Updates the caller's profile.
pub async fn update_profile<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> ServerResult<Json<UserProfile>> {
    Ok(Json(
        account::update_profile(&state.store, user.id, request).await?,
    ))
}

/// Deletes the caller's account.
pub async fn delete_profile<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(request): ValidJson<DeleteAccountRequest>,
) -> ServerResult<Json<MessageResponse>> {
    Ok(Json(
        account::delete_account(&state.store, user.id, request).await?,
    ))
}
