//! Show endpoints.

use std::sync::Arc;

use api_protocol::{CreateShowRequest, DeleteShowResponse, ShowsQuery, UpdateShowRequest};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use concert_store::ConcertStore;
use entities::ShowDetail;

use crate::error::ServerResult;
use crate::middleware::ValidJson;
use crate::services::{shows, validation::parse_id};
use crate::state::AppState;

/// Creates a show.
pub async fn create_show<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    ValidJson(request): ValidJson<CreateShowRequest>,
) -> ServerResult<(StatusCode, Json<ShowDetail>)> {
    let detail = shows::create_show(&state.store, request).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Lists shows, most recent first.
pub async fn list_shows<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ShowsQuery>,
) -> ServerResult<Json<Vec<ShowDetail>>> {
    Ok(Json(shows::list_shows(&state.store, query).await?))
}

/// Gets a show.
pub async fn get_show<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<ShowDetail>> {
    let id = parse_id("show", &id)?;
    Ok(Json(shows::get_show(&state.store, id).await?))
}

/// Updates a show.
pub async fn update_show<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateShowRequest>,
) -> ServerResult<Json<ShowDetail>> {
    let id = parse_id("show", &id)?;
    Ok(Json(shows::update_show(&state.store, id, request).await?))
}

/// Deletes a show and its attendance records.
pub async fn delete_show<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteShowResponse>> {
    let id = parse_id("show", &id)?;
    Ok(Json(shows::delete_show(&state.store, id).await?))
}
