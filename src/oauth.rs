//! OAuth 1.0a request signing (HMAC-SHA1) and token responses.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::error::{GetSatError, Result};
use crate::transport::{HttpMethod, HttpRequest};

type HmacSha1 = Hmac<Sha1>;

/// An OAuth token and its secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl TokenPair {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

/// Where the OAuth protocol parameters go on a signed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Header,
    Query,
}

/// Signs requests on behalf of a consumer and, optionally, a token.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    consumer_key: &'a str,
    consumer_secret: &'a str,
    token: Option<(&'a str, &'a str)>,
}

impl<'a> Signer<'a> {
    pub fn new(consumer_key: &'a str, consumer_secret: &'a str) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: &'a str, secret: &'a str) -> Self {
        self.token = Some((token, secret));
        self
    }

    /// Sign `request` in place with a fresh nonce and the current time.
    pub fn sign(&self, request: &mut HttpRequest, placement: Placement) -> Result<()> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();
        self.sign_with(request, placement, &nonce, timestamp)
    }

    /// Sign `request` with a caller-chosen nonce and timestamp.
    pub fn sign_with(
        &self,
        request: &mut HttpRequest,
        placement: Placement,
        nonce: &str,
        timestamp: i64,
    ) -> Result<()> {
        let mut oauth = self.protocol_params(nonce, timestamp);
        let signature = self.signature(request, &oauth)?;
        oauth.push(("oauth_signature".to_string(), signature));

        match placement {
            Placement::Header => {
                request
                    .headers
                    .push(("Authorization".to_string(), authorization_header(&oauth)));
            }
            Placement::Query => {
                let mut pairs = request.url.query_pairs_mut();
                for (key, value) in &oauth {
                    pairs.append_pair(key, value);
                }
            }
        }
        Ok(())
    }

    fn protocol_params(&self, nonce: &str, timestamp: i64) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.to_string()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];
        if let Some((token, _)) = self.token {
            params.push(("oauth_token".to_string(), token.to_string()));
        }
        params
    }

    fn signature(&self, request: &HttpRequest, oauth: &[(String, String)]) -> Result<String> {
        let base = base_string(request, oauth);
        let token_secret = self.token.map_or("", |(_, secret)| secret);
        let key = format!("{}&{}", encode(self.consumer_secret), encode(token_secret));

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| GetSatError::Auth(format!("invalid signing key: {e}")))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// The RFC 5849 signature base string.
pub fn base_string(request: &HttpRequest, oauth: &[(String, String)]) -> String {
    let mut params: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .collect();
    if request.method == HttpMethod::Post {
        params.extend(request.form.iter().map(|(k, v)| (encode(k), encode(v))));
    }
    params.extend(oauth.iter().map(|(k, v)| (encode(k), encode(v))));
    params.sort();

    let normalized = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut base_url = request.url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    format!(
        "{}&{}&{}",
        request.method.as_str(),
        encode(base_url.as_str()),
        encode(&normalized)
    )
}

fn authorization_header(oauth: &[(String, String)]) -> String {
    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Parse an `application/x-www-form-urlencoded` body into key → values.
pub fn parse_form(body: &str) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        map.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    map
}

/// Extract `oauth_token` and `oauth_token_secret` from a token endpoint body.
///
/// # Errors
///
/// Returns [`GetSatError::TokenResponse`] if either field is absent.
pub fn parse_token_response(body: &str) -> Result<TokenPair> {
    let form = parse_form(body);
    let first = |key: &'static str| {
        form.get(key)
            .and_then(|values| values.first())
            .cloned()
            .ok_or(GetSatError::TokenResponse(key))
    };
    Ok(TokenPair {
        token: first("oauth_token")?,
        secret: first("oauth_token_secret")?,
    })
}

/// The browser URL where a user authorizes `request_token`.
pub fn authorize_url(oauth_root: &Url, request_token: &str) -> Result<Url> {
    let mut url = oauth_root.join("authorize")?;
    url.query_pairs_mut().append_pair("oauth_token", request_token);
    Ok(url)
}
