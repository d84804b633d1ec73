//! Error types for metering demo operations.

use std::path::PathBuf;

/// Result alias for controller operations.
pub type Result<T> = std::result::Result<T, DemoError>;

/// Result alias for key/value store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure of the persistent key/value store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Storage is disabled, full, or otherwise unreachable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The backing data exists but cannot be decoded.
    #[error("storage data is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

/// The identity provider rejected or failed the sign-out request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("sign-out failed: {message}")]
pub struct SignOutError {
    /// Provider-specific description
    pub message: String,
}

impl SignOutError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the demo state controller.
#[derive(thiserror::Error, Debug)]
pub enum DemoError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    SignOut(#[from] SignOutError),
    #[error("invalid PPID: {0:?}")]
    InvalidPpid(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the validation task itself (not lint findings).
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checker failed: {0}")]
    Checker(String),
}
