//! Shared types for the GapHunter client.
//!
//! This module defines the domain types of the scan service's HTTP
//! contract: the opaque scan identifier, the job lifecycle status, the
//! status snapshot returned by each poll, and the scan submission request.

use crate::error::GapHunterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for scan job identifiers.
///
/// Scan IDs are issued by the engine on submission and treated as opaque
/// handles; the only constraint enforced here is that they are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Create a new `ScanId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, GapHunterError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GapHunterError::Validation(
                "scan ID must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a scan job as reported by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStatus {
    /// Job accepted, waiting for a worker
    Queued,
    /// Job is being executed
    Running,
    /// Job finished and produced a result
    Success,
    /// Job finished with an error
    Failed,
}

impl ScanStatus {
    /// Whether this status ends the polling loop.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "QUEUED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Point-in-time view of a scan job, produced by each status poll.
///
/// Snapshots are never mutated, only replaced by the next poll's snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    /// Scan job identifier
    pub id: String,
    /// Current lifecycle state
    pub status: ScanStatus,
    /// Result payload, present once the scan succeeded
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error message, present when the scan failed
    #[serde(default)]
    pub error_message: Option<String>,
    /// Label of the pipeline stage currently executing
    #[serde(default)]
    pub stage: Option<String>,
}

/// Parameters for submitting a new scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Tags defining the market surface to scan
    pub tags: Vec<String>,
    /// Terms to exclude from the scan
    #[serde(default)]
    pub excluded_terms: Vec<String>,
}

impl ScanRequest {
    /// Create a request scanning the given tags with no exclusions.
    #[must_use]
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            tags,
            excluded_terms: Vec::new(),
        }
    }

    /// Set the excluded terms.
    #[must_use]
    pub fn with_excluded_terms(mut self, excluded_terms: Vec<String>) -> Self {
        self.excluded_terms = excluded_terms;
        self
    }

    /// Validate the request before submission.
    ///
    /// # Errors
    /// Returns error if no tags are given or any tag is blank.
    pub fn validate(&self) -> Result<(), GapHunterError> {
        if self.tags.is_empty() {
            return Err(GapHunterError::Validation(
                "a scan needs at least one tag".to_string(),
            ));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(GapHunterError::Validation(
                "tags must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_id_valid() {
        let id = ScanId::new("scan-42").expect("valid scan ID");
        assert_eq!(id.as_str(), "scan-42");
        assert_eq!(id.to_string(), "scan-42");
    }

    #[test]
    fn test_scan_id_rejects_empty() {
        assert!(ScanId::new("").is_err());
        assert!(ScanId::new("   ").is_err());
    }

    #[test]
    fn test_scan_status_wire_spelling() {
        let status: ScanStatus = serde_json::from_str("\"RUNNING\"").expect("parse status");
        assert_eq!(status, ScanStatus::Running);

        let json = serde_json::to_string(&ScanStatus::Queued).expect("serialize status");
        assert_eq!(json, "\"QUEUED\"");
    }

    #[test]
    fn test_scan_status_terminal() {
        assert!(!ScanStatus::Queued.is_terminal());
        assert!(!ScanStatus::Running.is_terminal());
        assert!(ScanStatus::Success.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
    }

    #[test]
    fn test_snapshot_parsing() {
        let json = r#"{
            "id": "scan-7",
            "status": "RUNNING",
            "result": null,
            "stage": "EXPAND"
        }"#;

        let snapshot: ScanSnapshot = serde_json::from_str(json).expect("parse snapshot");
        assert_eq!(snapshot.id, "scan-7");
        assert_eq!(snapshot.status, ScanStatus::Running);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.stage.as_deref(), Some("EXPAND"));
        assert!(snapshot.error_message.is_none());
    }

    #[test]
    fn test_snapshot_error_message_field() {
        let json = r#"{"id": "scan-7", "status": "FAILED", "errorMessage": "scan worker died"}"#;
        let snapshot: ScanSnapshot = serde_json::from_str(json).expect("parse snapshot");
        assert_eq!(snapshot.status, ScanStatus::Failed);
        assert_eq!(snapshot.error_message.as_deref(), Some("scan worker died"));
    }

    #[test]
    fn test_scan_request_wire_shape() {
        let request = ScanRequest::new(vec!["fintech".to_string()])
            .with_excluded_terms(vec!["crypto".to_string()]);

        let json = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(json["tags"][0], "fintech");
        assert_eq!(json["excludedTerms"][0], "crypto");
    }

    #[test]
    fn test_scan_request_validation() {
        assert!(ScanRequest::new(vec![]).validate().is_err());
        assert!(ScanRequest::new(vec!["  ".to_string()]).validate().is_err());
        assert!(ScanRequest::new(vec!["saas".to_string()])
            .validate()
            .is_ok());
    }
}
