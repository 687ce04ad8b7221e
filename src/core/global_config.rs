//! Global configuration management
//!
//! Reads and manages global settings from `config.toml` in the config
//! directory: where to find the Lanefile, the default platform, dry-run mode
//! and output preferences. Command-line flags override these values.

use crate::infra::dirs::LanewayDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },

    /// Failed to write config file
    #[error("Failed to write config file '{path}': {error}")]
    WriteError { path: String, error: String },

    /// Key is not a known setting
    #[error("Unknown configuration key '{key}'. Known keys: {}", CONFIG_KEYS.join(", "))]
    UnknownKey { key: String },

    /// Value does not fit the setting
    #[error("Invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Settings addressable as `section.name`
pub const CONFIG_KEYS: &[&str] = &[
    "run.lanefile",
    "run.default_platform",
    "run.dry_run",
    "output.quiet",
    "output.json",
];

/// Global configuration for laneway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Lane execution defaults
    #[serde(default)]
    pub run: RunConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

/// Lane execution defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Lanefile used when `--lanefile` is not given
    pub lanefile: Option<PathBuf>,

    /// Platform tried first when a lane is requested without one
    pub default_platform: Option<String>,

    /// Report shell commands instead of running them
    pub dry_run: Option<bool>,
}

/// Output preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable quiet mode
    pub quiet: Option<bool>,

    /// Enable JSON output
    pub json: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GlobalConfigError::ParseError` if the config file exists but
    /// contains invalid TOML.
    pub fn load(dirs: &LanewayDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Save global configuration to the config directory
    pub fn save(&self, dirs: &LanewayDirs) -> Result<(), GlobalConfigError> {
        self.save_to_path(&dirs.global_config_path())
    }

    /// Save global configuration to a specific path
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to_path(&self, path: &Path) -> Result<(), GlobalConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GlobalConfigError::WriteError {
                path: parent.display().to_string(),
                error: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| GlobalConfigError::WriteError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| GlobalConfigError::WriteError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Current value of a setting, `None` when unset
    pub fn get(&self, key: &str) -> Result<Option<String>, GlobalConfigError> {
        let value = match key {
            "run.lanefile" => self.run.lanefile.as_ref().map(|p| p.display().to_string()),
            "run.default_platform" => self.run.default_platform.clone(),
            "run.dry_run" => self.run.dry_run.map(|b| b.to_string()),
            "output.quiet" => self.output.quiet.map(|b| b.to_string()),
            "output.json" => self.output.json.map(|b| b.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a setting from its textual form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), GlobalConfigError> {
        match key {
            "run.lanefile" => self.run.lanefile = Some(PathBuf::from(value)),
            "run.default_platform" => {
                let platform = value.trim_start_matches(':');
                if platform.is_empty() || platform.contains(char::is_whitespace) {
                    return Err(GlobalConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        expected: "a platform name",
                    });
                }
                self.run.default_platform = Some(platform.to_string());
            }
            "run.dry_run" => self.run.dry_run = Some(parse_bool(key, value)?),
            "output.quiet" => self.output.quiet = Some(parse_bool(key, value)?),
            "output.json" => self.output.json = Some(parse_bool(key, value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Clear a setting back to its default
    pub fn unset(&mut self, key: &str) -> Result<(), GlobalConfigError> {
        match key {
            "run.lanefile" => self.run.lanefile = None,
            "run.default_platform" => self.run.default_platform = None,
            "run.dry_run" => self.run.dry_run = None,
            "output.quiet" => self.output.quiet = None,
            "output.json" => self.output.json = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Every setting with its current value, in [`CONFIG_KEYS`] order
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        CONFIG_KEYS
            .iter()
            .map(|key| (*key, self.get(key).ok().flatten()))
            .collect()
    }

    /// Effective dry-run setting
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.run.dry_run.unwrap_or(false)
    }

    /// Effective quiet setting
    #[must_use]
    pub fn quiet(&self) -> bool {
        self.output.quiet.unwrap_or(false)
    }

    /// Effective JSON output setting
    #[must_use]
    pub fn json(&self) -> bool {
        self.output.json.unwrap_or(false)
    }
}

fn unknown_key(key: &str) -> GlobalConfigError {
    GlobalConfigError::UnknownKey {
        key: key.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, GlobalConfigError> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(GlobalConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}
