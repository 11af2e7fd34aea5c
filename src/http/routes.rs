//! HTTP API Route Definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Create the router with all routes
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/operations", get(handlers::operations))
        // Web client JSON-RPC proxy
        .route("/api", post(handlers::proxy))
        // Content streaming
        .route("/content/:account_id/:uri", get(handlers::content_by_uri))
        .route(
            "/content/:account_id/outpoints/:outpoint/:file_name",
            get(handlers::content_by_outpoint),
        )
        .with_state(app_state)
}
