#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::store::MemoryStore;
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create AppState for testing with a fresh in-memory store.
    pub fn setup_test_app_state() -> AppState {
        AppState {
            store: Arc::new(MemoryStore::connect()),
        }
    }

    /// Initialize tracing for tests with output to STDERR. The log level is
    /// taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub fn setup_test_app() -> Router {
        let _ = init_test_tracing();
        create_router(setup_test_app_state())
    }

    /// Create a test server over a fresh app.
    pub fn setup_test_server() -> TestServer {
        TestServer::new(setup_test_app()).expect("failed to start test server")
    }

    /// POST a user and return its generated id.
    pub async fn create_test_user(server: &TestServer, email: &str) -> String {
        let response = server
            .post("/users")
            .json(&json!({
                "firstName": "Test",
                "lastName": "User",
                "email": email,
                "password": "testpassword",
            }))
            .await;
        assert_eq!(response.status_code(), 201, "seed user creation failed");
        let body: Value = response.json();
        body["id"].as_str().expect("user id missing").to_string()
    }
}
