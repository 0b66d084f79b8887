use axum::extract::State;
use axum::response::Json;
use tracing::instrument;

use crate::schemas::{AppState, HealthResponse};

/// Health check endpoint
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_status = match state.store.ping().await {
        Ok(()) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status,
    })
}
