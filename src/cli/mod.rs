//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the getsat binary.

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, Credentials, DEFAULT_API_URL, DEFAULT_OAUTH_URL};
use crate::error::Result;

/// Get Satisfaction API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "getsat", about = "Get Satisfaction API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection and credential settings.
#[derive(Args, Debug, Default)]
pub struct AuthArgs {
    #[arg(long, global = true, env = "GETSAT_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    #[arg(long, global = true, env = "GETSAT_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    #[arg(long, global = true, env = "GETSAT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, global = true, env = "GETSAT_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: Option<String>,

    /// Base URL of the REST API.
    #[arg(long, global = true, env = "GETSAT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL of the OAuth endpoints.
    #[arg(long, global = true, env = "GETSAT_OAUTH_URL", default_value = DEFAULT_OAUTH_URL)]
    pub oauth_url: String,

    /// Send OAuth parameters in the Authorization header.
    #[arg(long, global = true, env = "GETSAT_HEADER_AUTH")]
    pub header_auth: bool,
}

impl AuthArgs {
    /// Build a client configuration from these arguments.
    pub fn to_config(&self) -> Result<Config> {
        let credentials = Credentials {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            access_token: self.access_token.clone(),
            access_token_secret: self.access_token_secret.clone(),
        };
        Ok(Config::new(credentials)
            .with_api_url(&self.api_url)?
            .with_oauth_url(&self.oauth_url)?
            .with_header_auth(self.header_auth))
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch an endpoint, e.g. `fetch companies=acme products`.
    Fetch {
        /// Path steps; `segment=id` applies an identifier to a collection.
        #[arg(required = true, value_parser = parse_step)]
        steps: Vec<Step>,

        /// Query parameter as `key=value`. May be repeated.
        #[arg(long = "query", short = 'q', value_parser = parse_query)]
        query: Vec<(String, String)>,
    },

    /// List every endpoint path the client knows.
    Paths,

    /// Obtain a request token with the consumer credentials.
    RequestToken,

    /// Print the browser URL that authorizes a request token.
    AuthorizeUrl {
        /// The request token.
        token: String,
    },

    /// Exchange an authorized request token for an access token.
    AccessToken {
        /// The request token.
        token: String,
        /// The request token secret.
        secret: String,
        /// The verifier shown after authorization.
        verifier: String,
    },
}

/// One step of an endpoint path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub segment: String,
    pub identifier: Option<String>,
}

fn parse_step(raw: &str) -> std::result::Result<Step, String> {
    let (segment, identifier) = match raw.split_once('=') {
        Some((segment, id)) if !id.is_empty() => (segment, Some(id.to_string())),
        Some((_, _)) => return Err(format!("missing identifier in '{raw}'")),
        None => (raw, None),
    };
    if segment.is_empty() {
        return Err(format!("missing endpoint name in '{raw}'"));
    }
    Ok(Step {
        segment: segment.to_string(),
        identifier,
    })
}

fn parse_query(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

/// Borrow steps in the form [`EndpointTree::navigate`](crate::EndpointTree::navigate) takes.
pub fn step_refs(steps: &[Step]) -> Vec<(&str, Option<&str>)> {
    steps
        .iter()
        .map(|s| (s.segment.as_str(), s.identifier.as_deref()))
        .collect()
}

