//! HTTP API Layer
//!
//! Serves the maintenance read endpoint, the per-page change stream (SSE)
//! and the admin endpoints over axum.

pub mod error;
pub mod handler;
pub mod server;
pub mod session;
pub mod types;

pub use error::ApiError;
pub use server::{router, AppState, HttpServer, HttpServerConfig, ServerHandle};
