//! Recommendation endpoint.

use axum::Json;

use crate::error::{ServerError, ServerResult};

/// Show recommendations. Not implemented.
pub async fn get_recommendations() -> ServerResult<Json<serde_json::Value>> {
    Err(ServerError::NotImplemented(
        "Recommendations are not available yet".to_string(),
    ))
}
