//! HTTP transport.
//!
//! Requests and responses are plain data so the client can sign and inspect
//! them without depending on a particular HTTP stack. [`ReqwestTransport`] is
//! the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{GetSatError, Result};

const USER_AGENT: &str = concat!("getsat/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full URL, including the query string.
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// `application/x-www-form-urlencoded` body parameters.
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn post(url: Url, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: Vec::new(),
            form,
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes HTTP requests.
///
/// Implementations report transport failures as errors but return every
/// HTTP status, successful or not, as an [`HttpResponse`].
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(GetSatError::HttpError)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url.path()))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(request.url),
            HttpMethod::Post => self.http.post(request.url).form(&request.form),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(GetSatError::HttpError)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(GetSatError::HttpError)?;
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}
