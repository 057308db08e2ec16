//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::pipeline::thumbhash::MAX_ENCODER_SIZE;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.content_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.content_extensions must not be empty".into(),
            ));
        }
        if self.thumbhash.max_size == 0 || self.thumbhash.max_size > MAX_ENCODER_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "thumbhash.max_size must be between 1 and {MAX_ENCODER_SIZE}"
            )));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
