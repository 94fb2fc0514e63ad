use thiserror::Error;

/// Unified error type for the domain, service and storage layers.
#[derive(Debug, Error)]
pub enum BuddyError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, BuddyError>;

impl From<std::io::Error> for BuddyError {
    fn from(err: std::io::Error) -> Self {
        BuddyError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BuddyError {
    fn from(err: serde_json::Error) -> Self {
        BuddyError::Storage(err.to_string())
    }
}
