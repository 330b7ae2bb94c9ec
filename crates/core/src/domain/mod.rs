// Domain Layer - Pure business logic and entities

pub mod component;
pub mod error;
pub mod identity;
pub mod maintenance;
pub mod page_key;

// Re-exports
pub use component::{AdminComponent, ContentItem};
pub use error::DomainError;
pub use identity::{Identity, Role};
pub use maintenance::{ChangeEvent, ChangeKind, MaintenanceRecord, MaintenanceStatus};
pub use page_key::PageKey;
