//! API error handling for the NexoDrive dispatcher.
//!
//! Every failure is answered with `{"ok": false, "err": "<code>"}`. The code
//! is short and machine-readable; details only go to the log.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::DriveError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or unusable `path` parameter (400).
    Path,
    /// Unusable upload file name (400).
    Name,
    /// Malformed multipart body (400).
    Multipart,
    /// File not found (404).
    NotFound,
    /// Upload over the size bound (413).
    TooLarge,
    /// Blob store failure (500).
    Storage,
    /// Anything else (500).
    Internal,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Path | ErrorCode::Name | ErrorCode::Multipart => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::Storage | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire code sent in the `err` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Path => "path",
            ErrorCode::Name => "name",
            ErrorCode::Multipart => "multipart",
            ErrorCode::NotFound => "nf",
            ErrorCode::TooLarge => "size",
            ErrorCode::Storage => "fs",
            ErrorCode::Internal => "internal",
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub ok: bool,
    /// Short error code.
    #[schema(example = "nf")]
    pub err: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing or unusable `path` parameter.
    pub fn bad_path(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Path, message)
    }

    /// Malformed multipart body.
    pub fn bad_multipart(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Multipart, message)
    }

    /// Requested file is absent.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            ok: false,
            err: self.code.as_str().to_string(),
        };
        let mut response = (status, Json(body)).into_response();

        // The rest of an oversized body is not read; drop the connection
        // rather than leave the client streaming into the void.
        if self.code == ErrorCode::TooLarge {
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
        }

        response
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<DriveError> for ApiError {
    fn from(err: DriveError) -> Self {
        match &err {
            DriveError::Validation(msg) => ApiError::new(ErrorCode::Name, msg.clone()),
            DriveError::NotFound(msg) => ApiError::not_found(msg.clone()),
            DriveError::SizeLimitExceeded { .. } => ApiError::new(ErrorCode::TooLarge, err.to_string()),
            DriveError::Io(_) | DriveError::Storage(_) => {
                tracing::error!("Storage error: {}", err);
                ApiError::new(ErrorCode::Storage, err.to_string())
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::Path.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Name.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Multipart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::TooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::Storage.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(ErrorCode::Path.as_str(), "path");
        assert_eq!(ErrorCode::NotFound.as_str(), "nf");
        assert_eq!(ErrorCode::Storage.as_str(), "fs");
    }

    #[test]
    fn test_from_drive_error() {
        let err: ApiError = DriveError::NotFound("/u/x".to_string()).into();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err: ApiError = DriveError::Validation("bad".to_string()).into();
        assert_eq!(err.code(), ErrorCode::Name);

        let err: ApiError = DriveError::SizeLimitExceeded { limit: 1 }.into();
        assert_eq!(err.code(), ErrorCode::TooLarge);

        let err: ApiError = DriveError::Storage("gone".to_string()).into();
        assert_eq!(err.code(), ErrorCode::Storage);

        let err: ApiError = DriveError::Persistence("disk full".to_string()).into();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_too_large_closes_connection() {
        let response = ApiError::new(ErrorCode::TooLarge, "big").into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[header::CONNECTION], "close");

        let response = ApiError::not_found("x").into_response();
        assert!(response.headers().get(header::CONNECTION).is_none());
    }
}
