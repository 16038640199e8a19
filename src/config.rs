//! Client configuration and OAuth credentials.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{GetSatError, Result};

pub const DEFAULT_API_URL: &str = "https://api.getsatisfaction.com/";
pub const DEFAULT_OAUTH_URL: &str = "https://getsatisfaction.com/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth consumer and access-token pairs.
///
/// Without an access token pair every call is anonymous.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Consumer credentials only, for running the token exchange.
    pub fn consumer(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            consumer_key: Some(key.into()),
            consumer_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Attach an access token pair.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self.access_token_secret = Some(secret.into());
        self
    }

    /// The consumer key and secret.
    ///
    /// # Errors
    ///
    /// Returns [`GetSatError::Auth`] if either is missing.
    pub fn consumer_pair(&self) -> Result<(&str, &str)> {
        match (self.consumer_key.as_deref(), self.consumer_secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok((key, secret))
            }
            _ => Err(GetSatError::Auth(
                "consumer key and secret are required".to_string(),
            )),
        }
    }

    /// The access token pair, if both halves are present.
    pub fn access_pair(&self) -> Option<(&str, &str)> {
        match (
            self.access_token.as_deref(),
            self.access_token_secret.as_deref(),
        ) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                Some((token, secret))
            }
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_pair().is_some()
    }
}

/// Settings for a [`GetSatClient`](crate::GetSatClient).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub oauth_url: Url,
    /// Send OAuth parameters in an `Authorization` header instead of the
    /// query string.
    pub header_auth: bool,
    pub timeout: Duration,
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            oauth_url: Url::parse(DEFAULT_OAUTH_URL).expect("default OAuth URL is valid"),
            header_auth: false,
            timeout: DEFAULT_TIMEOUT,
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Default endpoints with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Read configuration from environment variables.
    ///
    /// All variables are optional:
    ///
    /// - `GETSAT_CONSUMER_KEY`, `GETSAT_CONSUMER_SECRET`
    /// - `GETSAT_ACCESS_TOKEN`, `GETSAT_ACCESS_TOKEN_SECRET`
    /// - `GETSAT_API_URL`, `GETSAT_OAUTH_URL`
    /// - `GETSAT_HEADER_AUTH` (`true`/`false`/`1`/`0`)
    ///
    /// # Errors
    ///
    /// Returns an error if a URL or `GETSAT_HEADER_AUTH` cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        let credentials = Credentials {
            consumer_key: var("GETSAT_CONSUMER_KEY"),
            consumer_secret: var("GETSAT_CONSUMER_SECRET"),
            access_token: var("GETSAT_ACCESS_TOKEN"),
            access_token_secret: var("GETSAT_ACCESS_TOKEN_SECRET"),
        };

        let mut config = Self::new(credentials);
        if let Some(url) = var("GETSAT_API_URL") {
            config = config.with_api_url(&url)?;
        }
        if let Some(url) = var("GETSAT_OAUTH_URL") {
            config = config.with_oauth_url(&url)?;
        }
        if let Some(flag) = var("GETSAT_HEADER_AUTH") {
            config.header_auth = parse_flag(&flag)?;
        }
        Ok(config)
    }

    /// Override the API base URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        self.api_url = base_url(url)?;
        Ok(self)
    }

    /// Override the OAuth base URL.
    pub fn with_oauth_url(mut self, url: &str) -> Result<Self> {
        self.oauth_url = base_url(url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_header_auth(mut self, header_auth: bool) -> Self {
        self.header_auth = header_auth;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse a base URL, ensuring it ends with `/` so relative joins keep its path.
pub(crate) fn base_url(url: &str) -> Result<Url> {
    if url.ends_with('/') {
        Ok(Url::parse(url)?)
    } else {
        Ok(Url::parse(&format!("{url}/"))?)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(GetSatError::Configuration(format!(
            "GETSAT_HEADER_AUTH must be true or false, got '{other}'"
        ))),
    }
}
