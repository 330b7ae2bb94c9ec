// Resolver timing configuration (no magic values)

use crate::error::{AppError, Result};
use std::time::Duration;

/// Per-attempt bound on a status request (5s)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fallback poll cadence when no change event arrives (120s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ResolverConfig {
    pub fn new(request_timeout: Duration, poll_interval: Duration) -> Result<Self> {
        if request_timeout.is_zero() {
            return Err(AppError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if poll_interval.is_zero() {
            return Err(AppError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            request_timeout,
            poll_interval,
        })
    }
}
