//! System handlers: health and timing diagnostics

use axum::{extract::State, response::IntoResponse, Json};

use super::AppState;
use crate::http::types::{HealthResponse, OperationsResponse};

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        daemon_url: state.core.daemon_endpoint().to_string(),
        indexed_content: state.index.len(),
    })
}

/// Recently timed daemon operations
pub async fn operations(State(state): State<AppState>) -> impl IntoResponse {
    let recorder = state.core.recorder();
    Json(OperationsResponse {
        open: recorder.open_count(),
        recent: recorder.recent(),
    })
}
