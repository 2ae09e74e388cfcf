//! HTTP delivery to the document registry.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use tracing::trace;

use super::sender::{DocumentSender, SendOutcome, SubmissionError, SubmissionRequest};
use crate::config::ApiConfig;
use crate::error::Result;

/// Header carrying the detached document signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Posts documents as JSON to the registry endpoint.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: Client,
    url: String,
}

impl HttpSender {
    /// Create a sender from API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(SubmissionError::Http)?;

        Ok(Self::with_client(client, config.url.clone()))
    }

    /// Create a sender around an existing client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Get the endpoint this sender posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl<D> DocumentSender<D> for HttpSender
where
    D: Serialize + Send + Sync,
{
    async fn send(
        &self,
        request: &SubmissionRequest<D>,
    ) -> std::result::Result<SendOutcome, SubmissionError> {
        let body = serde_json::to_vec(&request.document)?;

        trace!(url = %self.url, bytes = body.len(), "Posting document");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, request.signature.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(SendOutcome {
            status: status.as_u16(),
            body,
        })
    }
}
