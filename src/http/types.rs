//! HTTP API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::timing::Operation;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the service is healthy
    pub healthy: bool,
    /// Service version
    pub version: String,
    /// Daemon endpoint requests are forwarded to
    pub daemon_url: String,
    /// Records in the content index
    pub indexed_content: usize,
}

/// Timing diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsResponse {
    /// Timers started but not yet closed
    pub open: usize,
    /// Most recently closed operations, oldest first
    pub recent: Vec<Operation>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }
}
