//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory that site-relative image paths resolve against
    pub static_root: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            static_root: PathBuf::from("public"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Max images processed concurrently
    pub parallel_workers: usize,

    /// Content file extensions picked up from directories
    pub content_extensions: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: default_parallelism(),
            content_extensions: ["yml", "yaml", "json", "toml"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Number of available CPU cores, or 4 if it cannot be queried.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Thumbhash placeholder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbhashConfig {
    /// Whether to generate thumbhashes (metadata is always extracted)
    pub enabled: bool,

    /// Longest edge of the resampled image fed to the encoder (1..=100)
    pub max_size: u32,
}

impl Default for ThumbhashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: crate::pipeline::thumbhash::DEFAULT_MAX_SIZE,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height) accepted for full decode
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 16384,
            decode_timeout_ms: 10_000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
