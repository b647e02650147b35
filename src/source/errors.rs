use crate::simulator::SimulatorError;
use crate::trace::TraceError;
use thiserror::Error;

/// Failure to obtain a trace or catalog entry
#[derive(Error, Debug)]
pub enum SourceError {
    /// Connection, timeout, or transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status; `message` is the body's `error` member when present
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered 2xx but flagged `"success": false`
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Body was not the JSON shape we expected
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Body decoded but the steps do not form a valid trace
    #[error("Invalid trace: {0}")]
    InvalidTrace(#[from] TraceError),

    #[error("Simulator failed: {0}")]
    Simulator(#[from] SimulatorError),
}

impl SourceError {
    /// Transport-level failures are worth retrying; everything else will fail the same way again
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Network(_) => true,
            SourceError::Status { status, .. } => *status >= 500,
            SourceError::Rejected(_)
            | SourceError::Decode(_)
            | SourceError::InvalidTrace(_)
            | SourceError::Simulator(_) => false,
        }
    }
}
