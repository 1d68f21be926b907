//! Core Error Types
//!
//! Errors raised while *setting up* the client layer: malformed base URLs and
//! unusable proxy or timeout settings. Faults reported by the remote analysis engine
//! are a separate concern and live in [`crate::fault`]; they are stored on the
//! component that raised them rather than propagated as `CoreError`.

use thiserror::Error;

/// Core error type for the Quality Lens workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid or unusable configuration (base URL, proxy, timeouts)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
