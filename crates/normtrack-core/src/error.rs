use thiserror::Error;

/// Top-level error type for the normtrack system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// NormtrackError` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NormtrackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Assistant error: {0}")]
    Assistant(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for NormtrackError {
    fn from(err: toml::de::Error) -> Self {
        NormtrackError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NormtrackError {
    fn from(err: toml::ser::Error) -> Self {
        NormtrackError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for NormtrackError {
    fn from(err: serde_json::Error) -> Self {
        NormtrackError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for normtrack operations.
pub type Result<T> = std::result::Result<T, NormtrackError>;
