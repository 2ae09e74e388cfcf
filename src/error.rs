//! Error types for Tollgate.

use thiserror::Error;

use crate::submit::SubmissionError;

/// Main error type for Tollgate operations.
#[derive(Error, Debug)]
pub enum TollgateError {
    /// Invalid construction parameters or configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A waiting acquisition was abandoned by its caller
    #[error("Acquisition cancelled while waiting for a slot")]
    Cancelled,

    /// The gate was shut down
    #[error("Admission gate has been shut down")]
    Shutdown,

    /// The downstream send failed after a slot was granted
    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for TollgateError {
    fn from(e: config::ConfigError) -> Self {
        TollgateError::Config(e.to_string())
    }
}

/// Result type alias for Tollgate operations.
pub type Result<T> = std::result::Result<T, TollgateError>;
