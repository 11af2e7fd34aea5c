//! HTTP API Server Module
//!
//! Exposes the proxy endpoint used by web clients, range streaming of
//! downloaded content and a couple of diagnostic routes.

pub mod handlers;
pub mod identity;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use server::HttpServer;
