//! Platform-specific directory management
//!
//! Locates the directory holding laneway's global `config.toml`. Follows the
//! XDG Base Directory layout on Linux and the standard locations on macOS.
//!
//! `LANEWAY_CONFIG_DIR` overrides the default location.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "LANEWAY_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "laneway";

/// Name of the global config file
const CONFIG_FILE: &str = "config.toml";

/// Directory provider for laneway
#[derive(Debug, Clone)]
pub struct LanewayDirs {
    config_dir: PathBuf,
}

impl LanewayDirs {
    /// Resolve directories from the environment, falling back to platform
    /// defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/laneway` or `~/.config/laneway`
    /// - macOS: `~/Library/Application Support/laneway`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Path to `config.toml` in the config directory
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for LanewayDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_new_creates_instance() {
        let dirs = LanewayDirs::new();
        assert!(!dirs.config_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_global_config_path_is_under_config_dir() {
        let dirs = LanewayDirs::new();
        assert!(dirs.global_config_path().starts_with(dirs.config_dir()));
        assert!(dirs.global_config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_explicit_config_dir() {
        let dirs = LanewayDirs::with_config_dir(Path::new("/tmp/laneway-test"));
        assert_eq!(
            dirs.global_config_path(),
            PathBuf::from("/tmp/laneway-test/config.toml")
        );
    }
}
