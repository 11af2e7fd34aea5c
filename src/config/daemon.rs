//! Daemon link and HTTP API server configuration

use serde::{Deserialize, Serialize};

/// Content daemon JSON-RPC endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// JSON-RPC endpoint URL
    pub url: String,
    /// Client-side deadline for one RPC round trip (unset = wait for the daemon)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5279/".to_string(),
            timeout_secs: None,
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address for HTTP server (e.g., "0.0.0.0:8000")
    pub listen_addr: String,
    /// Enable CORS (useful for browser-based clients served from elsewhere)
    #[serde(default)]
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".to_string(),
            cors_enabled: false,
        }
    }
}
