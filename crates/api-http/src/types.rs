//! HTTP Request/Response Types

use serde::{Deserialize, Serialize};

/// Query of `GET /api/maintenance/events`
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Router path or key; normalized before subscribing
    #[serde(default)]
    pub page_path: String,
}

/// Body of `PUT /api/admin/{component}/{id}`
#[derive(Debug, Deserialize)]
pub struct UpsertItemRequest {
    pub data: serde_json::Value,
}

/// `GET /healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
