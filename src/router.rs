use crate::catalog;
use crate::handlers::{crud, health::health_check};
use crate::schemas::AppState;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

/// Root liveness probe.
async fn root() -> Json<Value> {
    Json(json!("Server is running."))
}

/// Create application router with all routes and middleware. The per-resource
/// route tables come straight out of the catalog; nothing here knows about
/// individual entity types.
pub fn create_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check));

    for resource in catalog::all().iter().copied() {
        app = app.nest(
            &format!("/{}", resource.collection),
            crud::resource_routes(resource),
        );
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(30)))
            .layer(CorsLayer::permissive()),
    )
    .with_state(state)
}
