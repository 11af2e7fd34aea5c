//! Service lifecycle
//!
//! Wires the gateway, the content index and the HTTP server together, runs
//! until Ctrl+C or SIGTERM and persists the index on the way out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::content::{spawn_indexer, ContentIndex, ContentServer};
use crate::events::EventEmitter;
use crate::gateway::{DaemonTransport, GatewayCore, HttpTransport};
use crate::http::{AppState, HttpServer};
use crate::timing::TimingRecorder;

/// Running service components
pub struct Service {
    config: Config,
    state: AppState,
    indexer: JoinHandle<()>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Service {
    /// Build every component against the production daemon transport
    pub fn start(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.daemon)
            .context("Failed to create daemon client")?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build every component around the given daemon transport
    pub fn with_transport(config: Config, transport: Arc<dyn DaemonTransport>) -> Result<Self> {
        info!("Starting lbryweb");
        info!("Daemon endpoint: {}", transport.endpoint());

        let index = match &config.content.index_path {
            Some(path) => Arc::new(ContentIndex::load(path)?),
            None => Arc::new(ContentIndex::new()),
        };
        let (events, receiver) = EventEmitter::channel();
        let indexer = spawn_indexer(index.clone(), receiver);

        let recorder = Arc::new(TimingRecorder::new(
            config.timing.keying,
            config.timing.history_capacity,
        ));
        let core = GatewayCore::new(transport, recorder, config.content.base_url.clone())
            .with_events(events);

        let state = AppState {
            core: Arc::new(core),
            index,
            content: Arc::new(ContentServer::new(&config.content)),
        };
        let (shutdown_tx, _) = broadcast::channel(4);

        info!(
            "Serving content from {}",
            config.content.download_dir.display()
        );

        Ok(Self {
            config,
            state,
            indexer,
            shutdown_tx,
        })
    }

    /// Shared handler state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle that stops [`run`](Self::run) when sent to
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Serve HTTP until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let http_server = HttpServer::new(self.config.http.clone(), self.state.clone());
        let shutdown_rx_http = self.shutdown_tx.subscribe();
        let mut http_handle = tokio::spawn(async move { http_server.run(shutdown_rx_http).await });

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = wait_for_sigterm() => {
                info!("Received SIGTERM, shutting down");
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown requested");
            }
            result = &mut http_handle => {
                // The server stopped on its own; surface why
                return match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(anyhow::anyhow!("HTTP server task failed: {}", e)),
                };
            }
        }

        let _ = self.shutdown_tx.send(());

        let http_abort = http_handle.abort_handle();
        match tokio::time::timeout(Duration::from_secs(5), http_handle).await {
            Ok(Ok(Err(e))) => error!("HTTP server failed: {}", e),
            Ok(_) => info!("HTTP server shut down cleanly"),
            Err(_) => {
                warn!("HTTP server did not shut down within 5s, aborting");
                http_abort.abort();
            }
        }

        self.shutdown().await
    }

    async fn shutdown(self) -> Result<()> {
        info!("Shutting down");
        let Self { state, indexer, .. } = self;
        let index = state.index.clone();

        // The gateway core holds the last event sender; once it is gone the
        // indexer drains what is queued and exits.
        drop(state);
        if tokio::time::timeout(Duration::from_secs(5), indexer).await.is_err() {
            warn!("Content indexer did not drain within 5s");
        }

        tokio::task::spawn_blocking(move || index.save())
            .await
            .context("Content index save task failed")?
            .context("Failed to persist content index")?;
        info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}. Falling back to pending future.", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
