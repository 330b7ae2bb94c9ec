// Page Key - normalized lookup key for per-page maintenance records

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest key accepted from untrusted input (URL segments, admin writes)
pub const MAX_PAGE_KEY_LEN: usize = 255;

/// Logical page key (`"home"` for the site root, otherwise the path without
/// its leading separator)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(String);

impl PageKey {
    /// Key used for the site root
    pub const HOME: &'static str = "home";

    /// Normalize a router path into its lookup key.
    ///
    /// `"/"` maps to `"home"`, `"/news"` to `"news"`, `"/a/b"` to `"a/b"`.
    /// Query strings, fragments and trailing separators are dropped.
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.trim_end_matches('/');

        if path.is_empty() {
            Self(Self::HOME.to_string())
        } else {
            Self(path.to_string())
        }
    }

    /// Validate an already-normalized key (e.g. a decoded URL segment)
    pub fn parse(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(DomainError::InvalidPageKey("key cannot be empty".into()));
        }
        if key.len() > MAX_PAGE_KEY_LEN {
            return Err(DomainError::InvalidPageKey(format!(
                "key too long (max {} chars)",
                MAX_PAGE_KEY_LEN
            )));
        }
        if key.starts_with('/') || key.ends_with('/') {
            return Err(DomainError::InvalidPageKey(format!(
                "key must not start or end with '/': {}",
                key
            )));
        }
        if key
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || c == '?' || c == '#')
        {
            return Err(DomainError::InvalidPageKey(format!(
                "key contains forbidden characters: {:?}",
                key
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_home(&self) -> bool {
        self.0 == Self::HOME
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
