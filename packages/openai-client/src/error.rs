//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The model answered with an empty message
    #[error("Empty completion from model {0}")]
    EmptyCompletion(String),
}

impl OpenAIError {
    /// Whether retrying (possibly with another model) can help.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAIError::Network(_) | OpenAIError::EmptyCompletion(_) => true,
            OpenAIError::Api { status, .. } => *status == 429 || *status >= 500 || *status == 404,
            OpenAIError::Parse(_) => false,
        }
    }
}
