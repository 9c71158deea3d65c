use thiserror::Error;

/// Failure reported by a single dispatch of a wrapped remote call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// The server refused the call (HTTP 429 or equivalent).
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limit exceeded after {attempts} attempts: {message}")]
    RateLimitExceeded { attempts: u32, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// A wait was interrupted by shutdown. Not a failure.
    #[error("cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
