//! Application settings: TOML file plus environment overrides.
//!
//! Precedence, lowest to highest:
//! 1. [`Settings::default`]
//! 2. a TOML file (`--config seasonality.toml`)
//! 3. `SEASONALITY_*` environment variables
//!
//! Command-line flags are applied on top of this by the binary.
//!
//! ```toml
//! provider = "csv"
//! data_dir = "./prices"
//! period = "10y"
//! http_timeout_secs = 20
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::env::lookup_env_var;

/// Environment variable overriding [`Settings::provider`].
pub const ENV_PROVIDER: &str = "SEASONALITY_PROVIDER";
/// Environment variable overriding [`Settings::data_dir`].
pub const ENV_DATA_DIR: &str = "SEASONALITY_DATA_DIR";
/// Environment variable overriding [`Settings::period`].
pub const ENV_PERIOD: &str = "SEASONALITY_PERIOD";
/// Environment variable overriding [`Settings::http_timeout_secs`].
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SEASONALITY_HTTP_TIMEOUT_SECS";

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys.
    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting was present but could not be interpreted.
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },
}

/// Runtime settings shared by the CLI and the provider registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Provider code (`yahoo`, `alpaca`, `csv`). Parsed by the price feed.
    pub provider: String,
    /// Directory holding `<SYMBOL>.csv` files for the CSV provider.
    pub data_dir: Option<PathBuf>,
    /// Default lookback period when `--period` is not given.
    pub period: String,
    /// Per-request HTTP timeout for network providers.
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: "yahoo".to_string(),
            data_dir: None,
            period: "max".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Loads settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => load_settings_path(path)?,
            None => Self::default(),
        };
        base.with_env(lookup_env_var)
    }

    /// Applies `SEASONALITY_*` overrides using the given lookup.
    ///
    /// The lookup is injected so callers (and tests) are not tied to the
    /// process environment.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup(ENV_PROVIDER) {
            self.provider = provider.trim().to_lowercase();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(period) = lookup(ENV_PERIOD) {
            self.period = period.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: ENV_HTTP_TIMEOUT_SECS.to_string(),
                        value: raw.clone(),
                    })?;
        }
        Ok(self)
    }
}

/// Parses settings from a TOML string. Missing keys take their defaults.
pub fn load_settings_str(s: &str) -> Result<Settings, ConfigError> {
    let mut settings: Settings = toml::from_str(s)?;
    settings.provider = settings.provider.trim().to_lowercase();
    Ok(settings)
}

/// Reads and parses a TOML settings file.
pub fn load_settings_path(path: &Path) -> Result<Settings, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_settings_str(&s)
}
