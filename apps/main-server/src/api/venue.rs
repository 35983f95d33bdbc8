//! Venue endpoints. The `:id` path segment is the venue name in slug form.

use std::sync::Arc;

use api_protocol::{CreateVenueRequest, MessageResponse, UpdateVenueRequest, VenuesQuery};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use concert_store::ConcertStore;
use entities::Venue;

use crate::error::ServerResult;
use crate::middleware::ValidJson;
use crate::services::catalog;
use crate::state::AppState;

/// Creates a venue.
pub async fn create_venue<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(request): ValidJson<CreateVenueRequest>,
) -> ServerResult<(StatusCode, Json<Venue>)> {
    let venue = catalog::create_venue(&state.store, request).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

/// Lists venues, optionally filtered by name, city, state and country.
pub async fn list_venues<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<VenuesQuery>,
) -> ServerResult<Json<Vec<Venue>>> {
    Ok(Json(catalog::list_venues(&state.store, query).await?))
}

/// Gets a venue.
pub async fn get_venue<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<Venue>> {
    Ok(Json(catalog::resolve_venue_slug(&state.store, &id).await?))
}

/// Updates a venue.
pub async fn update_venue<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateVenueRequest>,
) -> ServerResult<Json<Venue>> {
    Ok(Json(catalog::update_venue(&state.store, &id, request).await?))
}

/// Deletes a venue.
pub async fn delete_venue<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    Ok(Json(catalog::delete_venue(&state.store, &id).await?))
}
