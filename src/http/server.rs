//! HTTP API Server
//!
//! Axum-based HTTP server for the proxy and content endpoints.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::HttpConfig;

use super::handlers::AppState;
use super::routes::create_router;

/// HTTP API server
pub struct HttpServer {
    config: HttpConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: HttpConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Run the HTTP server until `shutdown` fires
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .context("Invalid HTTP listen address")?;

        let mut app = create_router(self.state.clone());

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(Any)
                .expose_headers([
                    header::ACCEPT_RANGES,
                    header::CONTENT_LENGTH,
                    header::CONTENT_RANGE,
                ]);
            app = app.layer(cors);
        }

        app = app.layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind HTTP server")?;

        info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
