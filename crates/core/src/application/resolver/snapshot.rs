// Resolver read surface and the page gate decision

use super::resolve::Resolution;
use crate::domain::maintenance::DEFAULT_MAINTENANCE_NOTICE;
use crate::domain::{MaintenanceStatus, PageKey};
use serde::Serialize;

/// What the UI shell reads from a mounted resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverSnapshot {
    pub page_key: PageKey,
    pub is_maintenance: bool,
    pub maintenance_message: Option<String>,
    /// True only until the first resolution for the current key completes
    pub is_loading: bool,
    /// Last failure, for diagnostics only. Never gates rendering.
    pub error: Option<String>,
}

impl ResolverSnapshot {
    pub(crate) fn loading(page_key: PageKey) -> Self {
        Self {
            page_key,
            is_maintenance: false,
            maintenance_message: None,
            is_loading: true,
            error: None,
        }
    }

    pub(crate) fn resolved(
        page_key: PageKey,
        status: MaintenanceStatus,
        error: Option<String>,
    ) -> Self {
        Self {
            page_key,
            is_maintenance: status.is_maintenance,
            maintenance_message: status.maintenance_message,
            is_loading: false,
            error,
        }
    }

    pub fn status(&self) -> MaintenanceStatus {
        MaintenanceStatus {
            is_maintenance: self.is_maintenance,
            maintenance_message: self.maintenance_message.clone(),
        }
    }
}

impl From<Resolution> for ResolverSnapshot {
    fn from(resolution: Resolution) -> Self {
        Self::resolved(
            resolution.key,
            resolution.status,
            resolution.error.map(|e| e.to_string()),
        )
    }
}

/// What the layout renders for a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    /// Normal page content
    Content,
    /// Maintenance notice instead of the page
    Maintenance { message: String },
}

/// Branch between the maintenance notice and the page.
///
/// Loading and failed resolutions render content.
pub fn gate(snapshot: &ResolverSnapshot) -> PageView {
    if !snapshot.is_maintenance {
        return PageView::Content;
    }

    let message = snapshot
        .maintenance_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MAINTENANCE_NOTICE)
        .to_string();

    PageView::Maintenance { message }
}
