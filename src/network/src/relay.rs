//! Submission client for the relay's `/api/v2/submit` endpoint.

use crate::types::{ErrorResponse, SubmitRequest, SubmitResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use ttc_core::{ClientError, ExternalMessage, WalletLabel};

/// Path of the submit endpoint, appended to the relay base URL.
pub const SUBMIT_PATH: &str = "/api/v2/submit";

/// Bound on one submission, connect to last byte.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay client. One attempt per submission, no retries.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
    auth_header: String,
    timeout: Duration,
}

impl RelayClient {
    /// Creates a client for the relay at `endpoint`.
    pub fn new(endpoint: impl Into<String>, auth_header: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint.into(), auth_header.into(), SUBMIT_TIMEOUT)
    }

    fn with_timeout(endpoint: String, auth_header: String, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::TransportError(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint,
            auth_header,
            timeout,
        })
    }

    /// Full URL of the submit endpoint.
    pub fn submit_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), SUBMIT_PATH)
    }

    /// Encodes and submits `message`, returning the relay's message-body hash.
    pub async fn submit(
        &self,
        message: &ExternalMessage,
        label: WalletLabel,
        cancel: &CancellationToken,
    ) -> Result<String, ClientError> {
        let request = SubmitRequest::new(message, label)?;
        self.submit_request(&request, cancel).await
    }

    /// Submits an already encoded request.
    pub async fn submit_request(
        &self,
        request: &SubmitRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                error!("Request was canceled");
                Err(ClientError::Cancelled)
            }
            res = self.post(request) => {
                let (status, body) = res?;
                interpret_response(status, &body)
            }
        }
    }

    async fn post(&self, request: &SubmitRequest) -> Result<(StatusCode, String), ClientError> {
        let url = self.submit_url();
        debug!("Submitting {} payload to {}", request.wallet, url);

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, &self.auth_header)
            .json(request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;
        info!(status_code = status.as_u16(), "API response received");
        Ok((status, body))
    }

    fn request_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            error!("Request deadline exceeded after {:?}", self.timeout);
            ClientError::TimeoutError(self.timeout)
        } else {
            error!("Failed to send HTTP request: {}", e);
            ClientError::TransportError(e.to_string())
        }
    }
}

/// Maps a relay response to the message-body hash or a typed error.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<String, ClientError> {
    if status != StatusCode::OK {
        let rejection: ErrorResponse = serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse error response: {}", e);
            ClientError::MalformedResponse(format!("status {} with body {:?}: {}", status, body, e))
        })?;
        error!(code = rejection.code, message = %rejection.message, "Relay API error");
        return Err(ClientError::RelayRejected {
            code: rejection.code,
            message: rejection.message,
        });
    }

    let accepted: SubmitResponse = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse successful response: {}", e);
        ClientError::MalformedResponse(format!("status 200 with body {:?}: {}", body, e))
    })?;
    Ok(accepted.msg_body_hash)
}
