//! GapHunter API - HTTP transport layer for the GapHunter client.
//!
//! This crate issues requests against the GapHunter engine with per-request
//! timeouts, cooperative cancellation, and automatic retry of transient
//! failures. It is pure plumbing: stateless between calls and unaware of the
//! scan job lifecycle, which lives in the polling crate on top of it.
//!
//! # Features
//!
//! - Per-request timeout with descriptor-level override
//! - Abortable in-flight requests via `tokio_util` cancellation tokens
//! - Exponential-backoff retry of network failures and 5xx responses
//! - Content-negotiated response parsing with structured error extraction
//!
//! # Example
//!
//! ```rust,ignore
//! use gaphunter_api::{ApiClient, RequestDescriptor};
//! use gaphunter_core::ApiConfig;
//!
//! let client = ApiClient::new(ApiConfig::default())?;
//! let body = client
//!     .request(RequestDescriptor::get("/scans/scan-1"))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod request;

// Re-export commonly used types
pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use request::{Method, RequestDescriptor, ResponseBody};
