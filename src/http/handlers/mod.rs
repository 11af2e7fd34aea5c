//! HTTP API Request Handlers

mod content;
mod proxy;
mod system;

use std::sync::Arc;

use crate::content::{ContentIndex, ContentServer};
use crate::gateway::GatewayCore;

/// Maximum accepted proxy request body (1MB)
const MAX_PROXY_BODY: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<GatewayCore>,
    pub index: Arc<ContentIndex>,
    pub content: Arc<ContentServer>,
}

pub use content::{content_by_outpoint, content_by_uri};
pub use proxy::proxy;
pub use system::{health, operations};
