use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom Result type for gitall operations.
pub type Result<T> = StdResult<T, GitallError>;

/// Errors produced by gitall operations.
#[derive(Error, Debug)]
pub enum GitallError {
    /// Configuration file is missing, malformed, or fails validation.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The hosting API rejected a request or returned an unusable response.
    #[error("api error: {0}")]
    ApiError(String),

    /// A contextual error from an operation.
    #[error("{0}")]
    ContextError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl GitallError {
    /// Map the error to a process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError(_) => 2,
            Self::ApiError(_) => 3,
            Self::ContextError(_) | Self::IoError(_) => 1,
        }
    }
}
