//! API endpoints.

pub mod attendance;
pub mod auth;
pub mod band;
pub mod profile;
pub mod recommendation;
pub mod show;
pub mod venue;

use std::sync::Arc;

use api_protocol::HealthResponse;
use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use concert_store::ConcertStore;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Creates the API router with all endpoints.
///
/// Everything under `/api/v1` except `/api/v1/auth` requires a bearer token.
pub fn create_router<S: ConcertStore + 'static>(
    state: &Arc<AppState<S>>,
) -> Router<Arc<AppState<S>>> {
    let public = Router::new()
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>));

    let protected = Router::new()
        // Profile endpoints
        .route(
            "/profile",
            get(profile::get_profile::<S>)
                .put(profile::update_profile::<S>)
                .delete(profile::delete_profile::<S>),
        )
        // Show endpoints
        .route("/shows", post(show::create_show::<S>).get(show::list_shows::<S>))
        .route(
            "/shows/:id",
            get(show::get_show::<S>)
                .put(show::update_show::<S>)
                .delete(show::delete_show::<S>),
        )
        .route("/shows/:id/attend", post(attendance::attend_show::<S>))
        // Attendance endpoints
        .route("/attendances", get(attendance::list_attendances::<S>))
        .route(
            "/attendances/:id",
            get(attendance::get_attendance::<S>)
                .put(attendance::update_attendance::<S>)
                .delete(attendance::delete_attendance::<S>),
        )
        // Band endpoints
        .route("/bands", post(band::create_band::<S>).get(band::list_bands::<S>))
        .route(
            "/bands/:id",
            get(band::get_band::<S>)
                .put(band::update_band::<S>)
                .delete(band::delete_band::<S>),
        )
        // Venue endpoints
        .route("/venues", post(venue::create_venue::<S>).get(venue::list_venues::<S>))
        .route(
            "/venues/:id",
            put(venue::update_venue::<S>)
                .get(venue::get_venue::<S>)
                .delete(venue::delete_venue::<S>),
        )
        // Recommendation endpoints
        .route("/recommendations", get(recommendation::get_recommendations))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "JamTracker API is running!".to_string(),
    })
}
