use http::StatusCode;
use thiserror::Error;

/// Failures talking to the search, fetch-by-id, upload and rename endpoints.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid endpoint {endpoint}: {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("Endpoint responded with status {0}")]
    Status(StatusCode),

    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    pub fn endpoint(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::Endpoint {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid tool config: {0}")]
    Invalid(#[from] serde_json::Error),
}
