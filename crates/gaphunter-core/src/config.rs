//! Configuration management for the GapHunter client.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The transport and polling tunables
//! default to the values the hosted GapHunter engine is tuned for, but
//! every one of them can be overridden per deployment.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main client configuration.
///
/// This is loaded from `~/.config/gaphunter/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP transport settings
    pub api: ApiConfig,
    /// Scan polling behavior settings
    pub polling: PollingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `GAPHUNTER_API_BASE`: Override the engine base URL
    /// - `GAPHUNTER_REQUEST_TIMEOUT_MS`: Override the per-request timeout
    /// - `GAPHUNTER_POLL_CEILING_MS`: Override the global poll ceiling
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("GAPHUNTER_API_BASE") {
            if !val.trim().is_empty() {
                config.api.base_url = val;
                tracing::debug!("Override api.base_url from env");
            }
        }

        if let Ok(val) = std::env::var("GAPHUNTER_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                config.api.timeout_ms = ms;
                tracing::debug!("Override api.timeout_ms from env: {}", ms);
            }
        }

        if let Ok(val) = std::env::var("GAPHUNTER_POLL_CEILING_MS") {
            if let Ok(ms) = val.parse() {
                config.polling.ceiling_ms = ms;
                tracing::debug!("Override polling.ceiling_ms from env: {}", ms);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/gaphunter/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "gaphunter", "gaphunter").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Validate the loaded values.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for settings the poller cannot
    /// operate with (zero intervals, a shrinking backoff, a cap below the
    /// initial interval).
    pub fn validate(&self) -> ConfigResult<()> {
        self.polling.validate()
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the GapHunter engine API
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum additional attempts after a retryable failure
    pub max_retries: u32,
    /// Base delay for retry backoff in milliseconds (doubles per attempt)
    pub retry_base_delay_ms: u64,
}

impl ApiConfig {
    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry backoff base delay as a [`Duration`].
    #[must_use]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Base URL with any trailing slashes removed.
    #[must_use]
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1_000,
        }
    }
}

/// Scan polling behavior settings.
///
/// The poll interval starts short and grows geometrically up to a cap,
/// trading responsiveness early against request volume later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// First poll interval in milliseconds
    pub initial_interval_ms: u64,
    /// Geometric growth factor applied to the interval after each poll
    pub backoff_multiplier: f64,
    /// Upper bound on the poll interval in milliseconds
    pub max_interval_ms: u64,
    /// Global ceiling on total poll duration in milliseconds
    pub ceiling_ms: u64,
}

impl PollingConfig {
    /// Initial poll interval as a [`Duration`].
    #[must_use]
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    /// Maximum poll interval as a [`Duration`].
    #[must_use]
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    /// Global poll ceiling as a [`Duration`].
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms)
    }

    /// Validate the polling parameters.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if the multiplier is below 1.0,
    /// the initial interval is zero, or the cap is below the initial
    /// interval.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "polling.initial_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "polling.backoff_multiplier".to_string(),
                reason: "must be at least 1.0".to_string(),
            });
        }
        if self.max_interval_ms < self.initial_interval_ms {
            return Err(ConfigError::InvalidValue {
                field: "polling.max_interval_ms".to_string(),
                reason: "must not be below the initial interval".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1_200,
            backoff_multiplier: 1.15,
            max_interval_ms: 3_000,
            ceiling_ms: 300_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3001/api");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.api.max_retries, 3);
        assert_eq!(config.polling.initial_interval_ms, 1_200);
        assert_eq!(config.polling.max_interval_ms, 3_000);
        assert_eq!(config.polling.ceiling_ms, 300_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[polling]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(
            parsed.polling.initial_interval_ms,
            config.polling.initial_interval_ms
        );
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.api.base_url = "https://engine.gaphunter.io/api".to_string();
        config.polling.ceiling_ms = 120_000;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.api.base_url, "https://engine.gaphunter.io/api");
        assert_eq!(loaded.polling.ceiling_ms, 120_000);
    }

    #[test]
    fn test_partial_config() {
        // Partial TOML configs fill the rest with defaults
        let toml_str = r#"
[api]
base_url = "http://localhost:8080/api"

[polling]
ceiling_ms = 60000
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.polling.ceiling_ms, 60_000);
        // These should be defaults
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.polling.initial_interval_ms, 1_200);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("GAPHUNTER_REQUEST_TIMEOUT_MS", "5000");

        // Can't call load_with_env directly since it reads the real config
        // file, but the override logic is the same
        let mut config = AppConfig::default();
        if let Ok(val) = std::env::var("GAPHUNTER_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                config.api.timeout_ms = ms;
            }
        }
        assert_eq!(config.api.timeout_ms, 5_000);

        std::env::remove_var("GAPHUNTER_REQUEST_TIMEOUT_MS");
    }

    #[test]
    fn test_base_url_normalization() {
        let config = ApiConfig {
            base_url: "http://localhost:3001/api///".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(config.normalized_base_url(), "http://localhost:3001/api");
    }

    #[test]
    fn test_validate_rejects_shrinking_backoff() {
        let polling = PollingConfig {
            backoff_multiplier: 0.5,
            ..PollingConfig::default()
        };
        assert!(polling.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let polling = PollingConfig {
            initial_interval_ms: 0,
            ..PollingConfig::default()
        };
        assert!(polling.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_cap_below_initial() {
        let polling = PollingConfig {
            initial_interval_ms: 2_000,
            max_interval_ms: 1_000,
            ..PollingConfig::default()
        };
        assert!(polling.validate().is_err());
    }

    #[test]
    fn test_duration_accessors() {
        let config = AppConfig::default();
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.api.retry_base_delay(), Duration::from_secs(1));
        assert_eq!(
            config.polling.initial_interval(),
            Duration::from_millis(1_200)
        );
        assert_eq!(config.polling.ceiling(), Duration::from_secs(300));
    }
}
