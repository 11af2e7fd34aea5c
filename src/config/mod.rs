//! Configuration for lbryweb

mod content;
mod daemon;
mod logging;
mod timing;

pub use content::{ContentConfig, DEFAULT_CHUNK_SIZE};
pub use daemon::{DaemonConfig, HttpConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use timing::TimingConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Content daemon endpoint
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// HTTP API server configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Content storage and serving
    #[serde(default)]
    pub content: ContentConfig,
    /// Operation timing
    #[serde(default)]
    pub timing: TimingConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Every problem is reported at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        match Url::parse(&self.daemon.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "daemon url must be http or https, got scheme '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!("daemon url '{}' is invalid: {}", self.daemon.url, e)),
        }
        if self.daemon.timeout_secs == Some(0) {
            errors.push("daemon timeout_secs must be positive when set".to_string());
        }

        if let Err(e) = self.http.listen_addr.parse::<SocketAddr>() {
            errors.push(format!(
                "HTTP listen_addr '{}' is invalid: {}",
                self.http.listen_addr, e
            ));
        } else if self.http.listen_addr.ends_with(":0") {
            errors.push("HTTP listen port must be between 1 and 65535".to_string());
        }

        if let Err(e) = Url::parse(&self.content.base_url) {
            errors.push(format!(
                "content base_url '{}' is invalid: {}",
                self.content.base_url, e
            ));
        }
        if self.content.download_dir.as_os_str().is_empty() {
            errors.push("content download_dir must not be empty".to_string());
        }
        if self.content.chunk_size == 0 {
            errors.push("content chunk_size must be positive".to_string());
        }

        if self.timing.history_capacity == 0 {
            errors.push("timing history_capacity must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
