//! Error types for NexoDrive.

use thiserror::Error;

/// Common error type for NexoDrive.
#[derive(Error, Debug)]
pub enum DriveError {
    /// I/O error from the blob store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob store failure that is not a plain I/O error (e.g. the namespace
    /// directory is missing or is not a directory).
    #[error("storage error: {0}")]
    Storage(String),

    /// Metadata ledger could not be read or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Validation error for client input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Upload exceeds the configured maximum size.
    #[error("upload exceeds the maximum size of {limit} bytes")]
    SizeLimitExceeded {
        /// Configured maximum in bytes.
        limit: u64,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DriveError {
    fn from(e: serde_json::Error) -> Self {
        DriveError::Persistence(e.to_string())
    }
}

/// Result type alias for NexoDrive operations.
pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = DriveError::Validation("empty file name".to_string());
        assert_eq!(err.to_string(), "validation error: empty file name");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = DriveError::NotFound("/u/report.pdf".to_string());
        assert_eq!(err.to_string(), "/u/report.pdf not found");
    }

    #[test]
    fn test_size_limit_error_display() {
        let err = DriveError::SizeLimitExceeded { limit: 1024 };
        assert_eq!(
            err.to_string(),
            "upload exceeds the maximum size of 1024 bytes"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DriveError = io_err.into();
        assert!(matches!(err, DriveError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DriveError = json_err.into();
        assert!(matches!(err, DriveError::Persistence(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(DriveError::Storage("gone".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
