//! Get Satisfaction API client.
//!
//! Resolves endpoints from an [`EndpointTree`], signs and sends the request,
//! then decodes the JSON body according to what the endpoint yields.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::config::{Config, Credentials};
use crate::endpoint::{CollectionEndpoint, Endpoint, EndpointTree, NodeId, SingularEndpoint};
use crate::error::{GetSatError, Result};
use crate::oauth::{self, Placement, Signer, TokenPair};
use crate::resource::{Decoded, Resource, ResourceKind};
use crate::topology;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

const JSON_EXTENSION: &str = ".json";

/// Query string parameters for a fetch.
pub type Query<'a> = [(&'a str, &'a str)];

/// Get Satisfaction API client.
///
/// Cheaply cloneable; clones share the same transport. Each clone keeps its
/// own copy of the credentials.
///
/// # Example
///
/// ```no_run
/// use getsat::{GetSatClient, Config};
///
/// # async fn example() -> getsat::Result<()> {
/// let client = GetSatClient::new(Config::from_env()?)?;
/// let mut tree = client.endpoints()?;
///
/// let companies = tree.top("companies")?;
/// let employees = tree.child(companies, "employees")?;
/// tree.apply_filter(companies, "acme")?;
///
/// let people = client.fetch(&tree.endpoint(employees), &[]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GetSatClient {
    transport: Arc<dyn Transport>,
    config: Config,
}

impl std::fmt::Debug for GetSatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetSatClient")
            .field("api_url", &self.config.api_url.as_str())
            .field("authenticated", &self.config.credentials.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl GetSatClient {
    /// Create a client that talks HTTP through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `GETSAT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.config.credentials
    }

    /// Build a fresh endpoint tree for this session.
    pub fn endpoints(&self) -> Result<EndpointTree> {
        topology::build()
    }

    /// Fetch whatever `endpoint` yields.
    ///
    /// The view follows [`EndpointTree::cardinality`]: `Many` is read from the
    /// `data` field of the response body, `One` decodes the body itself.
    pub async fn fetch(&self, endpoint: &Endpoint<'_>, query: &Query<'_>) -> Result<Decoded> {
        match endpoint {
            Endpoint::Collection(e) => Ok(Decoded::Many(self.fetch_all(e, query).await?)),
            Endpoint::Singular(e) => Ok(Decoded::One(self.fetch_one(e, query).await?)),
        }
    }

    /// Fetch the endpoint at `id` in `tree`.
    pub async fn fetch_node(
        &self,
        tree: &EndpointTree,
        id: NodeId,
        query: &Query<'_>,
    ) -> Result<Decoded> {
        self.fetch(&tree.endpoint(id), query).await
    }

    /// Fetch a single resource.
    pub async fn fetch_one(
        &self,
        endpoint: &SingularEndpoint<'_>,
        query: &Query<'_>,
    ) -> Result<Resource> {
        let body = self.get_json(&endpoint.path()?, query).await?;
        Resource::from_value(endpoint.resource(), &body)
    }

    /// Fetch every resource on one response of a collection.
    pub async fn fetch_all(
        &self,
        endpoint: &CollectionEndpoint<'_>,
        query: &Query<'_>,
    ) -> Result<Vec<Resource>> {
        let body = self.get_json(&endpoint.path()?, query).await?;
        decode_envelope(endpoint.resource(), &body)
    }

    /// GET `<api_url>/<path>.json` and parse the body as JSON.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json(&self, path: &str, query: &Query<'_>) -> Result<Value> {
        let mut url = self.config.api_url.join(&format!("{path}{JSON_EXTENSION}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let mut request = HttpRequest::get(url);
        self.sign_request(&mut request)?;
        tracing::debug!(url = %request.url.path(), "fetching");

        let response = self.send(request).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Exchange consumer credentials for a request token.
    ///
    /// # Errors
    ///
    /// Returns [`GetSatError::Auth`] without touching the network if the
    /// consumer key or secret is missing.
    #[tracing::instrument(skip(self))]
    pub async fn request_token(&self) -> Result<TokenPair> {
        let (key, secret) = self.config.credentials.consumer_pair()?;
        let url = self.config.oauth_url.join("request_token")?;

        let mut request = HttpRequest::post(url, Vec::new());
        Signer::new(key, secret).sign(&mut request, self.placement())?;

        let response = self.send(request).await?;
        oauth::parse_token_response(&response.body)
    }

    /// The URL where the user authorizes `request_token` in a browser.
    pub fn authorize_url(&self, request_token: &str) -> Result<Url> {
        oauth::authorize_url(&self.config.oauth_url, request_token)
    }

    /// Exchange an authorized request token and verifier for an access token.
    ///
    /// On success the access token pair is stored in this client's
    /// credentials and used to sign later requests.
    #[tracing::instrument(skip(self, request_token, verifier))]
    pub async fn access_token(
        &mut self,
        request_token: &TokenPair,
        verifier: &str,
    ) -> Result<TokenPair> {
        let (key, secret) = self.config.credentials.consumer_pair()?;
        let url = self.config.oauth_url.join("access_token")?;

        let mut request = HttpRequest::post(
            url,
            vec![("oauth_verifier".to_string(), verifier.to_string())],
        );
        Signer::new(key, secret)
            .with_token(&request_token.token, &request_token.secret)
            .sign(&mut request, self.placement())?;

        let response = self.send(request).await?;
        let pair = oauth::parse_token_response(&response.body)?;

        self.config.credentials.access_token = Some(pair.token.clone());
        self.config.credentials.access_token_secret = Some(pair.secret.clone());
        tracing::info!("access token stored");
        Ok(pair)
    }

    fn placement(&self) -> Placement {
        if self.config.header_auth {
            Placement::Header
        } else {
            Placement::Query
        }
    }

    /// Sign with the access token if one is configured; otherwise leave the
    /// request anonymous.
    fn sign_request(&self, request: &mut HttpRequest) -> Result<()> {
        let credentials = &self.config.credentials;
        let Some((token, token_secret)) = credentials.access_pair() else {
            return Ok(());
        };
        let (key, secret) = credentials.consumer_pair().map_err(|_| {
            GetSatError::Auth("an access token requires a consumer key and secret".to_string())
        })?;
        Signer::new(key, secret)
            .with_token(token, token_secret)
            .sign(request, self.placement())
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.transport.send(request).await?;
        Self::check_response(response)
    }

    /// Check response status and convert errors.
    fn check_response(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }
        tracing::warn!(status = response.status, "request failed");
        Err(GetSatError::Request {
            status: response.status,
            body: response.body,
        })
    }
}

/// Decode a collection response: an object whose `data` field is an array.
pub fn decode_envelope(kind: ResourceKind, body: &Value) -> Result<Vec<Resource>> {
    let data = body.get("data").ok_or_else(|| {
        GetSatError::UnexpectedShape(format!("{kind} collection response has no 'data' field"))
    })?;
    match crate::resource::decode(kind, data)? {
        Decoded::Many(items) => Ok(items),
        Decoded::One(_) => Err(GetSatError::UnexpectedShape(format!(
            "{kind} collection 'data' is not an array"
        ))),
    }
}
