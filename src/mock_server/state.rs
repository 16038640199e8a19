//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Get Satisfaction API server.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::oauth::TokenPair;

/// Shared state for the mock server.
///
/// Resources are keyed by their URL path without the `.json` extension,
/// e.g. `companies/acme` or `companies/acme/employees`.
#[derive(Debug)]
pub struct MockState {
    /// Single resources, served as the bare object.
    pub resources: HashMap<String, Value>,

    /// Collections, served as `{"data": [...]}`.
    pub collections: HashMap<String, Vec<Value>>,

    /// Reject unsigned resource requests with 401.
    pub require_signature: bool,

    /// Token handed out by `request_token`.
    pub request_token: TokenPair,

    /// Token handed out by `access_token`.
    pub access_token: TokenPair,

    /// Verifier `access_token` accepts.
    pub verifier: String,

    /// Paths of every request received, in order.
    pub requests: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
            collections: HashMap::new(),
            require_signature: false,
            request_token: TokenPair::new("request-token", "request-secret"),
            access_token: TokenPair::new("access-token", "access-secret"),
            verifier: "verifier".to_string(),
            requests: Vec::new(),
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Serve `resource` at `path`.
    pub fn with_resource(mut self, path: &str, resource: Value) -> Self {
        self.resources.insert(path.to_string(), resource);
        self
    }

    /// Serve `items` as the collection at `path`.
    pub fn with_collection(mut self, path: &str, items: Vec<Value>) -> Self {
        self.collections.insert(path.to_string(), items);
        self
    }

    /// Require OAuth-signed resource requests.
    pub fn with_required_signature(mut self) -> Self {
        self.require_signature = true;
        self
    }

    /// Look up the response body for `path`.
    pub fn body_for(&self, path: &str) -> Option<Value> {
        if let Some(resource) = self.resources.get(path) {
            return Some(resource.clone());
        }
        self.collections
            .get(path)
            .map(|items| serde_json::json!({ "data": items }))
    }
}
