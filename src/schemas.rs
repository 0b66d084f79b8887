use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::DocumentStore;

/// Application state shared across handlers: the injected document store
/// handle, nothing else.
#[derive(Clone)]
pub struct AppState {
    /// Document store adapter
    pub store: Arc<dyn DocumentStore>,
}

/// Uniform error body: `{ message }`, extended with the offending keys for
/// PATCH rejections and with the allow-list for filter rejections.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "invalidUpdates", skip_serializing_if = "Option::is_none")]
    pub invalid_updates: Option<Vec<String>>,
    #[serde(rename = "allowedQueryParams", skip_serializing_if = "Option::is_none")]
    pub allowed_query_params: Option<Vec<String>>,
}

/// Confirmation body for deletes ("Deleted wallet").
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Document store status
    pub store: String,
}
