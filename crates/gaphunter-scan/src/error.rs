//! Error types for the scan polling layer.

use gaphunter_api::ApiError;
use gaphunter_core::ScanId;
use std::time::Duration;
use thiserror::Error;

/// Errors that terminate a polling session.
///
/// Cancellation and supersession are deliberate terminations, not errors;
/// they resolve through `ScanResolution` instead.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Transport failure that survived the transport layer's own retries
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The engine reported the scan job itself as failed
    #[error("scan {scan_id} failed: {message}")]
    ScanFailed {
        /// Scan job identifier
        scan_id: ScanId,
        /// Engine-provided failure message, or a generic fallback
        message: String,
    },

    /// The engine reported success but attached no result payload
    #[error("scan {scan_id} reported success without a result payload")]
    EmptyResult {
        /// Scan job identifier
        scan_id: ScanId,
    },

    /// The scan did not reach a terminal state within the poll ceiling
    #[error("scan did not complete within {ceiling:?}; try narrowing the tag selection")]
    PollTimeout {
        /// Configured ceiling on total poll duration
        ceiling: Duration,
    },

    /// The engine's submission response violated the contract
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The scan request failed local validation before submission
    #[error("invalid scan request: {0}")]
    InvalidRequest(String),
}

/// Result type alias using `ScanError`.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let scan_id = ScanId::new("scan-3").expect("valid scan ID");
        let err = ScanError::ScanFailed {
            scan_id: scan_id.clone(),
            message: "worker crashed".to_string(),
        };
        assert_eq!(err.to_string(), "scan scan-3 failed: worker crashed");

        let err = ScanError::EmptyResult { scan_id };
        assert_eq!(
            err.to_string(),
            "scan scan-3 reported success without a result payload"
        );

        let err = ScanError::PollTimeout {
            ceiling: Duration::from_secs(300),
        };
        assert!(err.to_string().contains("try narrowing"));
    }

    #[test]
    fn test_transport_errors_pass_through() {
        let api_err = ApiError::Network("connection reset".to_string());
        let err: ScanError = api_err.into();
        assert_eq!(err.to_string(), "network failure: connection reset");
        assert!(matches!(err, ScanError::Api(_)));
    }
}
