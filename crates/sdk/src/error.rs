//! SDK Error Types

use cgsg_core::port::FetchError;
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SdkError {
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            SdkError::Timeout(timeout_ms)
        } else if e.is_connect() {
            SdkError::Connection(e.to_string())
        } else {
            SdkError::Transport(e.to_string())
        }
    }
}

impl From<SdkError> for FetchError {
    fn from(e: SdkError) -> Self {
        match e {
            SdkError::Timeout(ms) => FetchError::Timeout(ms),
            SdkError::Api { status, .. } => FetchError::Status(status),
            SdkError::Serialization(e) => FetchError::Malformed(e.to_string()),
            SdkError::Connection(msg) | SdkError::Transport(msg) | SdkError::InvalidUrl(msg) => {
                FetchError::Transport(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mapping() {
        assert_eq!(FetchError::from(SdkError::Timeout(5000)), FetchError::Timeout(5000));
        assert_eq!(
            FetchError::from(SdkError::Api {
                status: 500,
                code: "internal_error".into(),
                message: "boom".into(),
            }),
            FetchError::Status(500)
        );
        assert_eq!(
            FetchError::from(SdkError::Connection("refused".into())),
            FetchError::Transport("refused".into())
        );

        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            FetchError::from(SdkError::from(malformed)),
            FetchError::Malformed(_)
        ));
    }
}
