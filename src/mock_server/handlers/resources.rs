//! Resource endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use super::oauth_param;
use crate::mock_server::state::MockState;

/// GET /{path}.json
pub async fn get_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    state.requests.push(path.clone());

    let Some(path) = path.strip_suffix(".json") else {
        return not_found(&path);
    };

    if state.require_signature
        && oauth_param(query.as_deref(), &headers, "oauth_signature").is_none()
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "OAuth signature required"})),
        )
            .into_response();
    }

    match state.body_for(path) {
        Some(body) => (StatusCode::OK, Json(body)).into_response(),
        None => not_found(path),
    }
}

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "message": format!("No resource at {}", path)
        })),
    )
        .into_response()
}
