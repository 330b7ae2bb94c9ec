// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid page key: {0}")]
    InvalidPageKey(String),

    #[error("Unknown admin component: {0}")]
    UnknownComponent(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
