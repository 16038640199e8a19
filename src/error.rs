//! Error types for Get Satisfaction API operations.

use thiserror::Error;

/// Errors that can occur while building endpoints, signing requests or
/// fetching resources.
#[derive(Debug, Error)]
pub enum GetSatError {
    /// Invalid topology declaration or configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No child with this name is registered on the parent endpoint.
    #[error("Unknown endpoint '{name}' under '{parent}'")]
    UnknownEndpoint { parent: String, name: String },

    /// A path was resolved through a collection that has no identifier.
    #[error("Cannot traverse collection '{segment}' without an identifier")]
    Traversal { segment: String },

    /// The API answered with a non-2xx status.
    #[error("Get Satisfaction API error (HTTP {status}): {body}")]
    Request { status: u16, body: String },

    /// OAuth credentials are missing for the requested operation.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A token endpoint answered without the expected token fields.
    #[error("Token response is missing '{0}'")]
    TokenResponse(&'static str),

    /// A decoded payload does not have the shape required by the endpoint.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// A timestamp attribute could not be parsed.
    #[error("Invalid timestamp '{value}' for attribute '{attribute}'")]
    InvalidTimestamp { attribute: String, value: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Result type alias for Get Satisfaction operations.
pub type Result<T> = core::result::Result<T, GetSatError>;
