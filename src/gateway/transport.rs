//! Daemon transport
//!
//! One JSON POST per RPC call, no retries. The network round trip is the only
//! part of the gateway behind a trait, so tests can observe outbound calls.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::error::GatewayError;
use crate::config::DaemonConfig;

/// Carries a JSON-RPC payload to the daemon and returns the decoded reply body
#[async_trait]
pub trait DaemonTransport: Send + Sync + Debug {
    /// Post one payload and decode the JSON body of the reply
    async fn post(&self, payload: &Value) -> Result<Value, GatewayError>;

    /// Endpoint description for logs
    fn endpoint(&self) -> &str;
}

/// HTTP transport backed by a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Build a transport for the configured daemon endpoint.
    ///
    /// Without `timeout_secs` the client waits as long as the daemon takes.
    pub fn new(config: &DaemonConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            GatewayError::DaemonFailure(format!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl DaemonTransport for HttpTransport {
    async fn post(&self, payload: &Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                GatewayError::DaemonFailure(format!("daemon at {} unreachable: {}", self.url, e))
            })?;

        let status = response.status();
        debug!("Daemon replied with HTTP {}", status);

        let body = response.text().await.map_err(|e| {
            GatewayError::DaemonFailure(format!("failed to read daemon reply ({}): {}", status, e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            GatewayError::DaemonFailure(format!(
                "malformed daemon reply ({}): {}: {}",
                status,
                e,
                crate::util::preview(&body, 200)
            ))
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
