//! Error types for record and attachment storage.

use normtrack_core::error::NormtrackError;

/// Errors from the form-record and attachment stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("records file error: {0}")]
    RecordsFile(String),
    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),
    #[error("invalid attachment path: {0}")]
    InvalidPath(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for NormtrackError {
    fn from(err: StoreError) -> Self {
        NormtrackError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::RecordsFile("truncated".to_string());
        assert_eq!(err.to_string(), "records file error: truncated");

        let err = StoreError::AttachmentNotFound("HIRARC/x.pdf".to_string());
        assert_eq!(err.to_string(), "attachment not found: HIRARC/x.pdf");

        let err = StoreError::InvalidPath("../escape".to_string());
        assert_eq!(err.to_string(), "invalid attachment path: ../escape");
    }

    #[test]
    fn test_store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_store_error_into_core() {
        let err: NormtrackError = StoreError::RecordsFile("bad".to_string()).into();
        assert!(matches!(err, NormtrackError::Store(_)));
        assert!(err.to_string().contains("bad"));
    }
}
