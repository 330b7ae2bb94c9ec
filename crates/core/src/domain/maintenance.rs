// Maintenance Domain Model

use super::page_key::PageKey;
use serde::{Deserialize, Serialize};

/// Longest maintenance message accepted by admin writes
pub const MAX_MESSAGE_LEN: usize = 500;

/// Notice shown when a page is in maintenance without its own message
pub const DEFAULT_MAINTENANCE_NOTICE: &str =
    "This page is currently undergoing maintenance. Please check back soon.";

/// Stored maintenance row (one per logical page)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub page_path: PageKey,
    pub is_maintenance: bool,
    pub maintenance_message: Option<String>,
    pub updated_at: i64, // epoch ms
}

impl MaintenanceRecord {
    pub fn status(&self) -> MaintenanceStatus {
        MaintenanceStatus {
            is_maintenance: self.is_maintenance,
            maintenance_message: self.maintenance_message.clone(),
        }
    }
}

/// Resolved maintenance status for a page.
///
/// `Default` is the fail-open status: not in maintenance, no message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceStatus {
    pub is_maintenance: bool,
    #[serde(default)]
    pub maintenance_message: Option<String>,
}

impl MaintenanceStatus {
    pub fn active(message: impl Into<String>) -> Self {
        Self {
            is_maintenance: true,
            maintenance_message: Some(message.into()),
        }
    }
}

/// Kind of row change published by the change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "insert"),
            ChangeKind::Update => write!(f, "update"),
            ChangeKind::Delete => write!(f, "delete"),
        }
    }
}

/// Row change notification. Only a refresh hint; never read for content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub page_path: PageKey,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, page_path: PageKey) -> Self {
        Self { kind, page_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_fail_open() {
        let status = MaintenanceStatus::default();
        assert!(!status.is_maintenance);
        assert!(status.maintenance_message.is_none());
    }

    #[test]
    fn test_status_missing_message_field_parses() {
        let status: MaintenanceStatus =
            serde_json::from_str(r#"{"is_maintenance": true}"#).unwrap();
        assert!(status.is_maintenance);
        assert!(status.maintenance_message.is_none());
    }

    #[test]
    fn test_change_event_wire_shape() {
        let event = ChangeEvent::new(ChangeKind::Update, PageKey::from_path("/news"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "update", "page_path": "news"}));
    }
}
