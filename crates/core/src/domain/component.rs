// Admin Component Domain Model
// Closed set of back-office content collections

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest item id accepted by admin writes
pub const MAX_ITEM_ID_LEN: usize = 128;

/// Content collections the admin back-office may edit.
///
/// Unknown keys are rejected when parsing, so no caller-supplied string
/// ever reaches the store as a table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminComponent {
    Casinos,
    Banners,
    Content,
    Media,
}

impl AdminComponent {
    pub const ALL: [AdminComponent; 4] = [
        AdminComponent::Casinos,
        AdminComponent::Banners,
        AdminComponent::Content,
        AdminComponent::Media,
    ];

    /// URL segment for this component
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminComponent::Casinos => "casinos",
            AdminComponent::Banners => "banners",
            AdminComponent::Content => "content",
            AdminComponent::Media => "media",
        }
    }

    /// Backing table
    pub fn table(&self) -> &'static str {
        match self {
            AdminComponent::Casinos => "casinos",
            AdminComponent::Banners => "banners",
            AdminComponent::Content => "content_blocks",
            AdminComponent::Media => "media_assets",
        }
    }

    /// Field that must be a non-empty string in `data`, if any
    pub fn required_field(&self) -> Option<&'static str> {
        match self {
            AdminComponent::Casinos => Some("name"),
            AdminComponent::Banners => Some("title"),
            AdminComponent::Media => Some("url"),
            AdminComponent::Content => None,
        }
    }
}

impl std::fmt::Display for AdminComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminComponent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        AdminComponent::ALL
            .into_iter()
            .find(|component| component.as_str() == s)
            .ok_or_else(|| DomainError::UnknownComponent(s.to_string()))
    }
}

/// One row of an admin component collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub component: AdminComponent,
    pub data: serde_json::Value,
    pub created_at: i64, // epoch ms
    pub updated_at: i64, // epoch ms
}

/// Validate an item id (1-128 chars of `[A-Za-z0-9_-]`)
pub fn validate_item_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(DomainError::ValidationError(
            "Item id cannot be empty".to_string(),
        ));
    }
    if id.len() > MAX_ITEM_ID_LEN {
        return Err(DomainError::ValidationError(format!(
            "Item id too long (max {} chars)",
            MAX_ITEM_ID_LEN
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DomainError::ValidationError(format!(
            "Item id must be alphanumeric, '_', or '-': {}",
            id
        )));
    }
    Ok(())
}

/// Validate the JSON payload stored for a component item
pub fn validate_item_data(component: AdminComponent, data: &serde_json::Value) -> Result<()> {
    let object = data.as_object().ok_or_else(|| {
        DomainError::ValidationError(format!("{} data must be a JSON object", component))
    })?;

    if let Some(field) = component.required_field() {
        let present = object
            .get(field)
            .and_then(|v| v.as_str())
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(DomainError::ValidationError(format!(
                "{} requires a non-empty '{}' field",
                component, field
            )));
        }
    }
    Ok(())
}
