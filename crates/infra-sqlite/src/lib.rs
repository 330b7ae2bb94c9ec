// SQLite Infrastructure Adapter
// Implements: MaintenanceRepository, ContentRepository, IdentityProvider, ChangeFeed

mod change_feed;
mod connection;
mod content_repository;
mod error;
mod identity_provider;
mod maintenance_repository;
mod migration;

pub use change_feed::BroadcastChangeFeed;
pub use connection::create_pool;
pub use content_repository::SqliteContentRepository;
pub use identity_provider::{hash_token, SqliteIdentityProvider};
pub use maintenance_repository::SqliteMaintenanceRepository;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
