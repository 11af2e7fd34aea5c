//! lbryweb: web-facing gateway to an lbrynet content daemon
//!
//! - Per-account JSON-RPC proxy with method-specific request and response
//!   augmentation
//! - Timing of every daemon round trip
//! - Fetch events feeding a content index
//! - Byte-range streaming of downloaded files

pub mod config;
pub mod content;
pub mod events;
pub mod gateway;
pub mod http;
pub mod service;
pub mod timing;
pub mod types;
pub mod util;

pub use config::Config;
pub use gateway::{Gateway, GatewayCore, GatewayError};
pub use service::Service;
pub use types::*;
