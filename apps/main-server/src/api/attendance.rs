//! Attendance endpoints.

use std::sync::Arc;

use api_protocol::{AttendShowRequest, MessageResponse, UpdateAttendanceRequest};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use concert_store::ConcertStore;
use entities::AttendanceDetail;

use crate::error::ServerResult;
use crate::middleware::{AuthenticatedUser, ValidJson};
use crate::services::{attendance, validation::parse_id};
use crate::state::AppState;

/// Records attendance at a show for the caller.
pub async fn attend_show<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(show_id): Path<String>,
    ValidJson(request): ValidJson<AttendShowRequest>,
) -> ServerResult<(StatusCode, Json<AttendanceDetail>)> {
    let show_id = parse_id("show", &show_id)?;
    let detail = attendance::attend_show(&state.store, user.id, show_id, request).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Lists the caller's attendance records.
pub async fn list_attendances<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Vec<AttendanceDetail>>> {
    Ok(Json(
        attendance::list_attendances(&state.store, user.id).await?,
    ))
}

/// Gets one of the caller's attendance records.
pub async fn get_attendance<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<AttendanceDetail>> {
    let id = parse_id("attendance", &id)?;
    Ok(Json(
        attendance::get_attendance(&state.store, user.id, id).await?,
    ))
}

/// Updates one of the caller's attendance records.
pub async fn update_attendance<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateAttendanceRequest>,
) -> ServerResult<Json<AttendanceDetail>> {
    let id = parse_id("attendance", &id)?;
    Ok(Json(
        attendance::update_attendance(&state.store, user.id, id, request).await?,
    ))
}

/// Deletes one of the caller's attendance records.
pub async fn delete_attendance<S: ConcertStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    let id = parse_id("attendance", &id)?;
    Ok(Json(
        attendance::delete_attendance(&state.store, user.id, id).await?,
    ))
}
