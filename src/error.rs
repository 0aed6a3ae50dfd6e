//! Error types for the benchmark harness.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Main error type for the benchmark harness
///
/// Only the startup layer produces these; the workload simulator and the
/// memory sampler cannot fail.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Bind error: {0}")]
    BindError(String),

    #[error("Framework adapter error: {0}")]
    AdapterError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl HarnessError {
    /// Create a bind error
    pub fn bind_error(msg: impl Into<String>) -> Self {
        Self::BindError(msg.into())
    }

    /// Create an adapter error
    pub fn adapter_error(msg: impl Into<String>) -> Self {
        Self::AdapterError(msg.into())
    }

    /// Create a server error
    pub fn server_error(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}
