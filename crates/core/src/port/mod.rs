// Port Layer - Interfaces for external dependencies

pub mod change_feed;
pub mod content_repository;
pub mod identity_provider;
pub mod maintenance_repository;
pub mod status_source;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use change_feed::{ChangeFeed, ChangeSubscription};
pub use content_repository::ContentRepository;
pub use identity_provider::IdentityProvider;
pub use maintenance_repository::MaintenanceRepository;
pub use status_source::{FetchError, MaintenanceStatusSource};
pub use time_provider::TimeProvider;
