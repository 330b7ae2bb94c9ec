//! CGSG SDK - Rust Client Library
//!
//! HTTP client for the maintenance gate. `MaintenanceClient` and
//! `SseChangeFeed` implement the resolver's ports, so a resolver can run
//! against a remote server.
//!
//! # Example
//!
//! ```no_run
//! use cgsg_core::application::{MaintenanceResolver, ResolverConfig};
//! use cgsg_sdk::{MaintenanceClient, SseChangeFeed};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MaintenanceClient::new("http://127.0.0.1:8787")?;
//!     let feed = SseChangeFeed::new(client.base_url())?;
//!
//!     let resolver = MaintenanceResolver::mount(
//!         "/promotions",
//!         Arc::new(client),
//!         Arc::new(feed),
//!         ResolverConfig::default(),
//!     );
//!
//!     let snapshot = resolver.snapshot();
//!     println!("maintenance: {}", snapshot.is_maintenance);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod feed;

pub use client::{HealthResponse, MaintenanceClient};
pub use error::{Result, SdkError};
pub use feed::SseChangeFeed;
