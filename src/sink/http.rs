//! HTTP PATCH transport.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Default timeout for one PATCH request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while sending results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint is not a valid URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl {
        /// URL as given.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(String),
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(String),
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Response to a PATCH request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl PatchResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends JSON bodies to one endpoint with `PATCH`.
///
/// Non-success statuses are returned as responses, not errors. There is no
/// retry; a failed request fails the round.
#[derive(Debug, Clone)]
pub struct PatchSink {
    client: Client,
    url: Url,
}

impl PatchSink {
    /// Creates a sink with the default request timeout.
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Creates a sink whose requests give up after `timeout`.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Self::with_client(client, url)
    }

    /// Creates a sink around an existing client.
    pub fn with_client(client: Client, url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, url })
    }

    /// Endpoint receiving the PATCH.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends `body` with `Content-Type: application/json`.
    pub fn send(&self, body: Vec<u8>) -> Result<PatchResponse, TransportError> {
        let bytes = body.len();
        let response = self
            .client
            .patch(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::debug!(url = %self.url, status, bytes, "PATCH sent");
        Ok(PatchResponse { status, body })
    }
}
