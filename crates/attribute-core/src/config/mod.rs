//! Configuration management for attribute.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Thumbhash settings
    pub thumbhash: ThumbhashConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.attribute.attribute/config.toml
    /// - Linux: ~/.config/attribute/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\attribute\config\config.toml
    ///
    /// Falls back to ~/.attribute/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "attribute", "attribute")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".attribute").join("config.toml")
            })
    }

    /// Get the resolved static asset root (with ~ expansion).
    pub fn static_root(&self) -> PathBuf {
        let path_str = self.general.static_root.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.processing.parallel_workers > 0);
        assert_eq!(config.thumbhash.max_size, 100);
        assert!(config.thumbhash.enabled);
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.general.static_root, PathBuf::from("public"));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[thumbhash]"));
        assert!(toml.contains("static_root"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[thumbhash]\nmax_size = 64\n").unwrap();
        assert_eq!(config.thumbhash.max_size, 64);
        assert!(config.thumbhash.enabled);
        assert_eq!(config.limits.decode_timeout_ms, 10_000);
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let err = Config::from_toml("[thumbhash]\nmax_size = 500\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nstatic_root = \"site/static\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.static_root(), PathBuf::from("site/static"));
    }

    #[test]
    fn test_static_root_expands_tilde() {
        let mut config = Config::default();
        config.general.static_root = PathBuf::from("~/site/public");
        let resolved = config.static_root();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with("site/public"));
    }
}
