//! Search endpoint

use crate::query::SearchRequest;
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// `GET /search?q=...&page=...`
pub async fn search(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Response {
    let query = Arc::clone(&state.query);

    match tokio::task::spawn_blocking(move || query.search(&request)).await {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => {
            tracing::warn!("Search failed (busy: {}): {}", e.is_busy(), e);
            unavailable(&e.to_string())
        }
        Err(e) => {
            tracing::error!("Search task failed: {}", e);
            unavailable("search task failed")
        }
    }
}

fn unavailable(message: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::RETRY_AFTER, "1")],
        Json(json!({ "error": message, "retryable": true })),
    )
        .into_response()
}
