//! GapHunter Scan - Scan job polling for the GapHunter client.
//!
//! This crate owns the submit → poll → resolve lifecycle of scan jobs. It
//! submits a scan to the engine, polls its status on a geometric backoff
//! schedule, reports progress, and guarantees that overlapping submissions
//! never corrupt consumer state: each submission supersedes the previous
//! session, whose late-arriving responses are dropped by generation check.
//!
//! # Features
//!
//! - One active polling session per poller, superseded atomically on submit
//! - Geometric poll backoff with a cap, trading early responsiveness
//!   against request volume later
//! - Global poll ceiling bounding worst-case resource holding
//! - Cooperative cancellation interrupting both sleeps and in-flight
//!   requests, with best-effort server-side cancel
//!
//! # Example
//!
//! ```rust,ignore
//! use gaphunter_api::ApiClient;
//! use gaphunter_core::{ApiConfig, PollingConfig, ScanRequest};
//! use gaphunter_scan::{ScanPoller, ScanResolution};
//! use std::sync::Arc;
//!
//! let api = Arc::new(ApiClient::new(ApiConfig::default())?);
//! let poller = ScanPoller::new(api, PollingConfig::default());
//!
//! let request = ScanRequest::new(vec!["devtools".to_string()]);
//! let resolution = poller
//!     .submit(request, |progress| {
//!         println!("scan {} at stage {:?}", progress.scan_id, progress.stage);
//!     })
//!     .await?;
//!
//! if let ScanResolution::Completed(outcome) = resolution {
//!     println!("gaps: {}", outcome.report);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod backoff;
pub mod error;
pub mod poller;
mod session;

// Re-export commonly used types
pub use backoff::BackoffSchedule;
pub use error::{Result, ScanError};
pub use poller::{ScanOutcome, ScanPoller, ScanProgress, ScanResolution};
