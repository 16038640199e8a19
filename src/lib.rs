//! Get Satisfaction API client library.
//!
//! The API is a tree of nested URLs such as `companies/acme/products`. This
//! crate models that tree explicitly: an [`EndpointTree`] declares every
//! endpoint, callers narrow collections by applying identifiers, and the
//! [`GetSatClient`] resolves the resulting path, fetches it and decodes the
//! JSON into [`Resource`] values.
//!
//! # Quick Start
//!
//! ```no_run
//! use getsat::{Config, GetSatClient};
//!
//! #[tokio::main]
//! async fn main() -> getsat::Result<()> {
//!     let client = GetSatClient::new(Config::from_env()?)?;
//!     let mut tree = client.endpoints()?;
//!
//!     // All topics
//!     let topics = tree.top("topics")?;
//!     let all = client.fetch_node(&tree, topics, &[("sort", "recently_active")]).await?;
//!     println!("Found {} topics", all.into_vec().len());
//!
//!     // One company, then its products
//!     let products = tree.navigate(&[("companies", Some("acme")), ("products", None)])?;
//!     for product in client.fetch_node(&tree, products, &[]).await?.into_vec() {
//!         println!("{}", product.title().unwrap_or("(untitled)"));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! - Collection endpoints (`companies`, `topics`, ...) yield many resources
//!   until an identifier is applied with [`EndpointTree::apply_filter`].
//! - Nothing below a collection can be addressed until that collection has an
//!   identifier; resolving such a path fails with [`GetSatError::Traversal`].
//! - Relation endpoints (`companies/{id}/employees`, ...) always yield many.
//!
//! # Configuration
//!
//! [`Config::from_env`] reads `GETSAT_CONSUMER_KEY`, `GETSAT_CONSUMER_SECRET`,
//! `GETSAT_ACCESS_TOKEN`, `GETSAT_ACCESS_TOKEN_SECRET`, `GETSAT_API_URL`,
//! `GETSAT_OAUTH_URL` and `GETSAT_HEADER_AUTH`. All are optional; without an
//! access token pair requests are anonymous.

mod client;
mod config;
mod endpoint;
mod error;
pub mod oauth;
mod resource;
pub mod topology;
mod transport;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{decode_envelope, GetSatClient, Query};
pub use config::{Config, Credentials, DEFAULT_API_URL, DEFAULT_OAUTH_URL};
pub use error::{GetSatError, Result};

// Endpoint tree
pub use endpoint::{
    Cardinality, CollectionEndpoint, Endpoint, EndpointTree, NodeId, NodeKind, SingularEndpoint,
};

// Resources
pub use resource::{decode, parse_timestamp, Attribute, Decoded, Resource, ResourceKind, Transform};

// Transport
pub use oauth::TokenPair;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
