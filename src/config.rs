//! Configuration module.
//!
//! Loads and validates a `pixmill.toml` file. Every key is optional; missing
//! keys take the stock defaults below.
//!
//! ```toml
//! # Apply EXIF orientation when loading
//! autorotate = false
//!
//! [save]
//! quality = 90              # Lossy encoding quality (0-100), omit for codec default
//! format = "png"            # Codec used when neither the call nor the filename picks one
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The loaded [`Config`] is meant to be read once at startup and handed to a
//! [`Loader`](crate::imaging::Loader), which carries the autorotate default
//! from then on.

use crate::imaging::SaveOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Process configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default for EXIF autorotation on load. Per-call options override it.
    pub autorotate: bool,
    /// Defaults applied to saves.
    pub save: SaveConfig,
}

/// Save defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveConfig {
    /// Lossy encoding quality, `0..=100`.
    pub quality: Option<u32>,
    /// Fallback codec name, e.g. `"png"`.
    pub format: Option<String>,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(quality) = self.save.quality.filter(|&q| q > 100) {
            return Err(ConfigError::Validation(format!(
                "save.quality must be 0-100, got {quality}"
            )));
        }
        if self.save.format.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "save.format must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Fill unset fields of `options` from the `[save]` section.
    ///
    /// The configured format only applies when `path` has no extension, so a
    /// filename still outranks the config.
    pub fn save_options(&self, mut options: SaveOptions, path: Option<&Path>) -> SaveOptions {
        if options.quality.is_none() {
            options.quality = self.save.quality;
        }
        let path_decides = path
            .and_then(crate::imaging::format::format_from_filename)
            .is_some();
        if options.format.is_none() && !path_decides {
            options.format = self.save.format.clone();
        }
        options
    }
}

/// Load config from the TOML file at `path`.
///
/// Returns defaults when the file does not exist. Unknown keys and
/// out-of-range values are errors.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixmill configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Rotate and mirror images upright according to their EXIF orientation tag
# when they are loaded. Can be overridden per command with --autorotate or
# --no-autorotate.
autorotate = false

# ---------------------------------------------------------------------------
# Saving
# ---------------------------------------------------------------------------
[save]
# Lossy encoding quality (0 = worst, 100 = best). Used by JPEG and AVIF.
# When unset, each codec uses its own default.
# quality = 90

# Codec to use when the output filename has no extension and the command
# does not pass --format. When unset, the input's format is kept.
# format = "png"
"##
}
