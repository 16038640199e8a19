//! OAuth token endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use super::oauth_param;
use crate::mock_server::state::MockState;
use crate::oauth::TokenPair;

/// POST /api/request_token
pub async fn request_token(
    State(state): State<Arc<RwLock<MockState>>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    state.requests.push("api/request_token".to_string());

    if oauth_param(query.as_deref(), &headers, "oauth_consumer_key").is_none() {
        return unauthorized("missing consumer key");
    }
    token_body(&state.request_token)
}

/// POST /api/access_token
pub async fn access_token(
    State(state): State<Arc<RwLock<MockState>>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = state.write().await;
    state.requests.push("api/access_token".to_string());

    let token = oauth_param(query.as_deref(), &headers, "oauth_token");
    if token.as_deref() != Some(state.request_token.token.as_str()) {
        return unauthorized("unknown request token");
    }

    let verifier = url::form_urlencoded::parse(body.as_bytes())
        .find(|(k, _)| k == "oauth_verifier")
        .map(|(_, v)| v.into_owned());
    if verifier.as_deref() != Some(state.verifier.as_str()) {
        return unauthorized("invalid verifier");
    }
    token_body(&state.access_token)
}

fn token_body(pair: &TokenPair) -> Response {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("oauth_token", &pair.token)
        .append_pair("oauth_token_secret", &pair.secret)
        .finish();
    (
        StatusCode::OK,
        [("content-type", "application/x-www-form-urlencoded")],
        body,
    )
        .into_response()
}

fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, reason.to_string()).into_response()
}
