// Application Layer - Use Cases and Business Logic

pub mod content;
pub mod maintenance_admin;
pub mod resolver;
pub mod session;

// Re-exports
pub use content::ContentService;
pub use maintenance_admin::{MaintenanceAdminService, SetMaintenanceRequest};
pub use resolver::{gate, MaintenanceResolver, PageView, ResolverConfig, ResolverSnapshot};
pub use session::SessionContext;
