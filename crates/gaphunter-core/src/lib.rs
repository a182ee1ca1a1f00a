//! GapHunter Core - Foundation crate for the GapHunter client.
//!
//! This crate provides the shared types, error handling, and configuration
//! management that the transport and polling crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Scan service domain types (`ScanId`, `ScanStatus`, `ScanSnapshot`, `ScanRequest`)
//!
//! # Example
//!
//! ```rust
//! use gaphunter_core::{AppConfig, ScanRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.polling.initial_interval_ms, 1_200);
//!
//! let request = ScanRequest::new(vec!["devtools".to_string()]);
//! request.validate()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, AppConfig, PollingConfig};
pub use error::{ConfigError, ConfigResult, GapHunterError, Result};
pub use types::{ScanId, ScanRequest, ScanSnapshot, ScanStatus};
