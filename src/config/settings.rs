//! Service settings loaded from a TOML file.
//!
//! Every field has a default, so a missing settings file is not an error. A file that
//! exists but cannot be parsed is.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "trend_monitor.toml";

/// Top-level settings structure representing the whole settings file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum number of keywords or products returned by a listing
    pub page_size: u64,
    /// Append-only JSON-lines file mirroring generated products, if enabled
    pub product_log: Option<PathBuf>,
    /// Keywords left `generating` for longer than this are returned to `watching` at start-up
    pub stale_generation_minutes: Option<u32>,
    /// Which generation adapter to use
    pub generator: GeneratorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 20,
            product_log: None,
            stale_generation_minutes: None,
            generator: GeneratorSettings::default(),
        }
    }
}

/// Generation adapter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Random SKU and slug URL, no network access
    #[default]
    Mock,
    /// POST to an external generation service
    Http,
}

/// Settings for the `[generator]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSettings {
    /// Adapter kind
    pub kind: GeneratorKind,
    /// Service endpoint, required when `kind = "http"`
    pub endpoint: Option<String>,
    /// Request timeout applied by the HTTP client
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::Mock,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text and validates them.
    ///
    /// # Errors
    /// Returns a `Config` error if the TOML is malformed or a value is out of range.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse settings: {e}"),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config {
                message: "page_size must be at least 1".to_string(),
            });
        }
        if self.generator.kind == GeneratorKind::Http && self.generator.endpoint.is_none() {
            return Err(Error::Config {
                message: "generator.endpoint is required when generator.kind = \"http\""
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file, falling back to defaults if the file does not exist.
///
/// # Errors
/// Returns a `Config` error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;
    Settings::from_toml(&contents)
}

/// Loads settings from `TREND_MONITOR_CONFIG`, or `./trend_monitor.toml` when unset.
///
/// # Errors
/// Returns a `Config` error if the file exists but cannot be read or parsed.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("TREND_MONITOR_CONFIG")
        .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
    load_settings(path)
}
