//! Band endpoints. The `:id` path segment is the band name in slug form.

use std::sync::Arc;

use api_protocol::{CreateBandRequest, MessageResponse, UpdateBandRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use concert_store::ConcertStore;
use entities::Band;

use crate::error::ServerResult;
use crate::middleware::ValidJson;
use crate::services::catalog;
use crate::state::AppState;

/// Creates a band.
pub async fn create_band<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(request): ValidJson<CreateBandRequest>,
) -> ServerResult<(StatusCode, Json<Band>)> {
    let band = catalog::create_band(&state.store, request).await?;
    Ok((StatusCode::CREATED, Json(band)))
}

/// Lists bands.
pub async fn list_bands<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<Band>>> {
    Ok(Json(catalog::list_bands(&state.store).await?))
}

/// Gets a band.
pub async fn get_band<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<Band>> {
    Ok(Json(catalog::resolve_band_slug(&state.store, &id).await?))
}

/// Updates a band.
pub async fn update_band<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateBandRequest>,
) -> ServerResult<Json<Band>> {
    Ok(Json(catalog::update_band(&state.store, &id, request).await?))
}

/// Deletes a band.
pub async fn delete_band<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    Ok(Json(catalog::delete_band(&state.store, &id).await?))
}
