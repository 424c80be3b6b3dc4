//! Errors shared by the HTTP clients.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    // Non-2xx answer; the body is kept for logs since neither service documents an error format
    #[error("Service answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ClientError {
    /// Turn a non-success response into a `Status` error, passing successes through.
    pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, Self> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }
}
