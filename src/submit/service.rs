//! Submission service: one gate slot per submission attempt.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::sender::{DocumentSender, SendOutcome, SubmissionRequest};
use crate::error::{Result, TollgateError};
use crate::gate::AdmissionGate;

/// Sequences admission and delivery for document submissions.
pub struct SubmissionService<S> {
    /// The shared admission gate
    gate: Arc<AdmissionGate>,
    /// The downstream sender
    sender: S,
}

impl<S> SubmissionService<S> {
    /// Create a new service over a shared gate.
    pub fn new(gate: Arc<AdmissionGate>, sender: S) -> Self {
        Self { gate, sender }
    }

    /// Get the admission gate this service draws slots from.
    pub fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    /// Get the downstream sender.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Submit a document, waiting for a gate slot first.
    ///
    /// A failed send still counts against the window; it is neither retried
    /// nor refunded.
    pub async fn submit<D>(&self, request: &SubmissionRequest<D>) -> Result<SendOutcome>
    where
        D: Send + Sync,
        S: DocumentSender<D>,
    {
        self.submit_until(request, std::future::pending::<()>()).await
    }

    /// Submit a document, abandoning the slot wait with
    /// [`TollgateError::Cancelled`] if `cancel` completes first.
    ///
    /// Cancellation only applies while waiting for a slot; once the send has
    /// started it runs to completion.
    #[instrument(skip_all, fields(submission_id = %Uuid::new_v4()))]
    pub async fn submit_until<D, F>(
        &self,
        request: &SubmissionRequest<D>,
        cancel: F,
    ) -> Result<SendOutcome>
    where
        D: Send + Sync,
        S: DocumentSender<D>,
        F: Future<Output = ()> + Send,
    {
        if let Err(e) = self.gate.acquire_until(cancel).await {
            debug!(error = %e, "Submission not admitted");
            return Err(e);
        }

        match self.sender.send(request).await {
            Ok(outcome) => {
                info!(status = outcome.status, "Document submitted");
                debug!(body = %outcome.body, "Registry response");
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "Document submission failed");
                Err(TollgateError::Submission(e))
            }
        }
    }
}
