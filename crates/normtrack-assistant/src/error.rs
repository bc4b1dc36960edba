//! Error types for the conversational query client.

use normtrack_core::error::NormtrackError;

/// Errors from the assistant's remote inference path.
///
/// None of these escape the client boundary as faults: `query_model`
/// reduces every one of them to an absent answer after logging.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("network fault: {0}")]
    Transport(String),
    #[error("rate limited by inference service")]
    RateLimited,
    #[error("inference request failed with status {0}")]
    Status(u16),
    #[error("malformed response from {model}: {detail}")]
    MalformedResponse { model: String, detail: String },
}

impl AssistantError {
    /// Whether another attempt may succeed.
    ///
    /// Rate limiting, non-200 statuses, and network faults are transient;
    /// a response that parsed but does not match the model family's shape
    /// is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AssistantError::MalformedResponse { .. })
    }
}

impl From<AssistantError> for NormtrackError {
    fn from(err: AssistantError) -> Self {
        NormtrackError::Assistant(err.to_string())
    }
}
