use crate::schemas::AppState;
use crate::store::MemoryStore;
use anyhow::Result;
use std::sync::Arc;

/// Initialize application state: construct the store adapter explicitly and
/// hand it to the handlers, rather than leaning on ambient module state.
pub async fn initialize_app_state() -> Result<AppState> {
    dotenvy::dotenv().ok();

    tracing::info!("Opening document store");
    let store = MemoryStore::connect();

    Ok(AppState {
        store: Arc::new(store),
    })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
