//! Mock Get Satisfaction API server.
//!
//! Provides an axum-based HTTP server that simulates the Get Satisfaction API
//! and its OAuth token endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;
use crate::config::{Config, Credentials};

/// A mock Get Satisfaction API server for testing.
///
/// Resources are served from the root (`/companies/acme.json`) and the OAuth
/// endpoints from `/api/` (`/api/request_token`).
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server with empty state.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Base URL for the OAuth endpoints.
    pub fn oauth_url(&self) -> String {
        format!("{}/api/", self.url)
    }

    /// A client configuration pointing at this server.
    pub fn config(&self, credentials: Credentials) -> Config {
        Config::new(credentials)
            .with_api_url(&self.url)
            .and_then(|c| c.with_oauth_url(&self.oauth_url()))
            .expect("mock server URL is valid")
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Paths of every request received so far.
    pub async fn requests(&self) -> Vec<String> {
        self.state.read().await.requests.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // OAuth routes
            .route("/api/request_token", post(handlers::request_token))
            .route("/api/access_token", post(handlers::access_token))
            // Health check
            .route("/health", get(health_check))
            // Every resource path
            .route("/*path", get(handlers::get_resource))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
