//! HTTP request handlers for the mock server.

pub mod oauth;
pub mod resources;

pub use oauth::*;
pub use resources::*;

use axum::http::HeaderMap;

/// Read an OAuth protocol parameter from the query string or the
/// `Authorization: OAuth ...` header.
pub(crate) fn oauth_param(query: Option<&str>, headers: &HeaderMap, name: &str) -> Option<String> {
    if let Some(query) = query {
        let found = url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned());
        if found.is_some() {
            return found;
        }
    }

    let header = headers.get("authorization")?.to_str().ok()?;
    let fields = header.strip_prefix("OAuth ")?;
    fields.split(", ").find_map(|field| {
        let (key, value) = field.split_once('=')?;
        if key != name {
            return None;
        }
        let value = value.trim_matches('"');
        urlencoding::decode(value).ok().map(|v| v.into_owned())
    })
}
