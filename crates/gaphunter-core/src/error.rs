//! Core error types for the GapHunter client.
//!
//! This module defines the central error type shared across the client
//! crates. Transport and polling errors live in their own crates; the
//! variants here cover configuration, validation, and I/O concerns.

use thiserror::Error;

/// Central error type for core GapHunter client operations.
#[derive(Error, Debug)]
pub enum GapHunterError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `GapHunterError`.
pub type Result<T> = std::result::Result<T, GapHunterError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GapHunterError::Validation("empty tag list".to_string());
        assert_eq!(err.to_string(), "validation error: empty tag list");

        let err = ConfigError::NoConfigDir;
        assert_eq!(
            err.to_string(),
            "could not determine config directory (XDG base directories not available)"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let core_err: GapHunterError = config_err.into();
        assert!(matches!(core_err, GapHunterError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let core_err: GapHunterError = io_err.into();
        assert!(matches!(core_err, GapHunterError::Io(_)));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "polling.backoff_multiplier".to_string(),
            reason: "must be at least 1.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for polling.backoff_multiplier: must be at least 1.0"
        );
    }
}
