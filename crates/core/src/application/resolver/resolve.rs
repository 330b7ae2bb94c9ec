// One-shot resolution: bounded fetch with fail-open fallback

use crate::domain::{MaintenanceStatus, PageKey};
use crate::port::{FetchError, MaintenanceStatusSource};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Outcome of one resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: PageKey,
    /// Fetched status, or the fail-open default when `error` is set
    pub status: MaintenanceStatus,
    pub error: Option<FetchError>,
}

/// Resolve the maintenance status of a router path.
///
/// Never fails: timeouts and every other fetch error fall back to
/// "not in maintenance" and are reported in `Resolution::error`.
pub async fn resolve(
    source: &dyn MaintenanceStatusSource,
    path: &str,
    timeout: Duration,
) -> Resolution {
    resolve_key(source, &PageKey::from_path(path), timeout).await
}

/// Same as [`resolve`] for an already-normalized key
pub async fn resolve_key(
    source: &dyn MaintenanceStatusSource,
    key: &PageKey,
    timeout: Duration,
) -> Resolution {
    let outcome = match tokio::time::timeout(timeout, source.fetch_status(key)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(FetchError::Timeout(timeout.as_millis() as u64)),
    };

    match outcome {
        Ok(status) => {
            debug!(
                page_key = %key,
                is_maintenance = status.is_maintenance,
                "Maintenance status resolved"
            );
            Resolution {
                key: key.clone(),
                status,
                error: None,
            }
        }
        Err(err) => {
            log_failure(key, &err);
            Resolution {
                key: key.clone(),
                status: MaintenanceStatus::default(),
                error: Some(err),
            }
        }
    }
}

fn log_failure(key: &PageKey, err: &FetchError) {
    match err {
        FetchError::Timeout(timeout_ms) => warn!(
            page_key = %key,
            timeout_ms = *timeout_ms,
            "Maintenance status request timed out, failing open"
        ),
        FetchError::Status(code) => warn!(
            page_key = %key,
            status = *code,
            "Maintenance status endpoint returned an error status, failing open"
        ),
        FetchError::Transport(msg) => error!(
            page_key = %key,
            error = %msg,
            "Maintenance status request failed, failing open"
        ),
        FetchError::Malformed(msg) => error!(
            page_key = %key,
            error = %msg,
            "Maintenance status response was malformed, failing open"
        ),
    }
}
