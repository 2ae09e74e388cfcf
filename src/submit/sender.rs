//! Downstream send capability.

use async_trait::async_trait;
use thiserror::Error;

/// A document paired with the signature that authorizes it.
///
/// Both parts are forwarded to the sender untouched.
#[derive(Debug, Clone)]
pub struct SubmissionRequest<D> {
    /// The document payload
    pub document: D,
    /// Detached signature, passed through verbatim
    pub signature: String,
}

impl<D> SubmissionRequest<D> {
    /// Create a new submission request.
    pub fn new(document: D, signature: impl Into<String>) -> Self {
        Self {
            document,
            signature: signature.into(),
        }
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Response status code
    pub status: u16,
    /// Response body
    pub body: String,
}

/// Errors raised by a downstream send.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Transport-level failure talking to the registry
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    /// The registry answered with a non-2xx status
    #[error("Registry responded with status {status}: {body}")]
    Status { status: u16, body: String },
    /// The document could not be encoded as JSON
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Failure reported by a custom sender
    #[error("{0}")]
    Other(String),
}

/// Trait for anything that can deliver a submission.
///
/// The submission service calls `send` only after the admission gate has
/// granted a slot, and awaits it to completion.
#[async_trait]
pub trait DocumentSender<D>: Send + Sync
where
    D: Send + Sync,
{
    /// Deliver the request and report the downstream result.
    async fn send(&self, request: &SubmissionRequest<D>) -> Result<SendOutcome, SubmissionError>;
}
