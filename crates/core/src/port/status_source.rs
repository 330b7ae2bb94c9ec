// Maintenance Status Source Port
// Read path consulted by the resolver (HTTP endpoint in production)

use crate::domain::{MaintenanceStatus, PageKey};
use async_trait::async_trait;
use thiserror::Error;

/// Why a status read failed. Every variant is absorbed by the resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    Malformed(String),
}

/// Status read endpoint
///
/// Implementations:
/// - HttpMaintenanceClient (cgsg-sdk): `GET /api/maintenance/{key}`
/// - MaintenanceAdminService: direct store read (in-process)
#[async_trait]
pub trait MaintenanceStatusSource: Send + Sync {
    /// Fetch the current status for a page key
    async fn fetch_status(&self, key: &PageKey) -> Result<MaintenanceStatus, FetchError>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted reply for one key
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Status(MaintenanceStatus),
        Error(FetchError),
        /// Reply after a delay
        Delayed(Duration, MaintenanceStatus),
        /// Never reply
        Hang,
    }

    /// Scriptable status source that records every call
    #[derive(Clone)]
    pub struct MockStatusSource {
        replies: Arc<Mutex<HashMap<String, MockReply>>>,
        fallback: Arc<Mutex<MockReply>>,
        calls: Arc<Mutex<Vec<PageKey>>>,
    }

    impl MockStatusSource {
        pub fn new(fallback: MockReply) -> Self {
            Self {
                replies: Arc::new(Mutex::new(HashMap::new())),
                fallback: Arc::new(Mutex::new(fallback)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Every key answers "not in maintenance"
        pub fn new_healthy() -> Self {
            Self::new(MockReply::Status(MaintenanceStatus::default()))
        }

        pub fn set_reply(&self, key: &str, reply: MockReply) {
            self.replies.lock().unwrap().insert(key.to_string(), reply);
        }

        pub fn set_fallback(&self, reply: MockReply) {
            *self.fallback.lock().unwrap() = reply;
        }

        pub fn calls(&self) -> Vec<PageKey> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls_for(&self, key: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|k| k.as_str() == key)
                .count()
        }
    }

    #[async_trait]
    impl MaintenanceStatusSource for MockStatusSource {
        async fn fetch_status(&self, key: &PageKey) -> Result<MaintenanceStatus, FetchError> {
            self.calls.lock().unwrap().push(key.clone());

            let reply = self
                .replies
                .lock()
                .unwrap()
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| self.fallback.lock().unwrap().clone());

            match reply {
                MockReply::Status(status) => Ok(status),
                MockReply::Error(err) => Err(err),
                MockReply::Delayed(delay, status) => {
                    tokio::time::sleep(delay).await;
                    Ok(status)
                }
                MockReply::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!("pending future never resolves")
                }
            }
        }
    }
}
