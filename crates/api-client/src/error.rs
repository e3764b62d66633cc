use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The materialized aggregate view is missing or misconfigured.
    #[error("Aggregate view unavailable: {0}")]
    BackendUnavailable(String),

    /// The summary procedure does not exist or raised an error.
    #[error("Summary RPC unavailable: {0}")]
    RpcUnavailable(String),

    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Whether the caller may fall through to a lower tier instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::BackendUnavailable(_) | ApiError::RpcUnavailable(_))
    }
}
