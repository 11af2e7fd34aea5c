//! Content serving configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default streaming chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Where fetched files live and how they are exposed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Public URL prefix content is served under
    pub base_url: String,
    /// Directory the daemon writes downloads into
    pub download_dir: PathBuf,
    /// Upper bound on a single file read while streaming
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// JSON file persisting the content index (in-memory only when unset)
    #[serde(default)]
    pub index_path: Option<PathBuf>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/content".to_string(),
            download_dir: PathBuf::from("downloads"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            index_path: None,
        }
    }
}
