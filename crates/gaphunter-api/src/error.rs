//! Error types for the HTTP transport layer.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the transport layer.
///
/// Only [`ApiError::Network`] and 5xx [`ApiError::HttpStatus`] values are
/// retryable; every other variant terminates the request immediately.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No response arrived within the configured duration
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller's cancellation token fired before or during the call
    #[error("request aborted")]
    Aborted,

    /// Connection-level failure (DNS, refused connection, broken transfer)
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status code
    #[error("{message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body, or `HTTP <code>`
        message: String,
        /// Parsed response body for caller inspection
        body: Option<serde_json::Value>,
    },

    /// The response body could not be decoded as expected
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// Internal error (client construction, request encoding)
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Whether a request failing with this error may be retried.
    ///
    /// Network failures and server-side (5xx) errors are transient;
    /// everything else is terminal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    /// The HTTP status code, when the server produced a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for transport operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::Network("connection refused".to_string()).is_retryable());
        assert!(ApiError::HttpStatus {
            status: 500,
            message: "HTTP 500".to_string(),
            body: None,
        }
        .is_retryable());
        assert!(ApiError::HttpStatus {
            status: 599,
            message: "HTTP 599".to_string(),
            body: None,
        }
        .is_retryable());

        assert!(!ApiError::HttpStatus {
            status: 400,
            message: "bad request".to_string(),
            body: None,
        }
        .is_retryable());
        assert!(!ApiError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!ApiError::Aborted.is_retryable());
        assert!(!ApiError::Decode("unexpected EOF".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::HttpStatus {
            status: 429,
            message: "quota exceeded".to_string(),
            body: None,
        };
        assert_eq!(err.to_string(), "quota exceeded");

        let err = ApiError::Timeout(Duration::from_millis(30_000));
        assert!(err.to_string().contains("timed out"));

        assert_eq!(ApiError::Aborted.to_string(), "request aborted");
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::HttpStatus {
            status: 503,
            message: "HTTP 503".to_string(),
            body: None,
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(ApiError::Aborted.status(), None);
    }
}
