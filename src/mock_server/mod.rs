//! Mock Get Satisfaction API server for E2E testing.
//!
//! Serves canned resources keyed by URL path, wraps collections in the
//! `{"data": [...]}` envelope, and answers the OAuth token endpoints. Unlike
//! wiremock, state persists across requests and every request path is
//! recorded for later assertions.
//!
//! # Example
//!
//! ```ignore
//! use getsat::mock_server::MockServer;
//! use getsat::{Credentials, GetSatClient};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = GetSatClient::new(server.config(Credentials::default())).unwrap();
//!
//!     let mut tree = client.endpoints().unwrap();
//!     let id = tree.navigate(&[("companies", Some("acme")), ("employees", None)]).unwrap();
//!     let people = client.fetch_node(&tree, id, &[]).await.unwrap().into_vec();
//!     assert_eq!(people[0].str("name"), Some("Ann Agent"));
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::MockState;
