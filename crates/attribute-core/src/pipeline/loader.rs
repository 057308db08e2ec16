//! Resolving site-relative image paths and reading their bytes.

use std::path::{Component, Path, PathBuf};

use crate::config::LimitsConfig;
use crate::error::ImageError;

/// Reads image files referenced by site-relative `src` paths.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    static_root: PathBuf,
    limits: LimitsConfig,
}

impl ImageLoader {
    /// Create a loader rooted at the given static asset directory.
    pub fn new(static_root: impl Into<PathBuf>, limits: LimitsConfig) -> Self {
        Self {
            static_root: static_root.into(),
            limits,
        }
    }

    /// The directory `src` paths resolve against.
    pub fn static_root(&self) -> &Path {
        &self.static_root
    }

    /// Map a `src` such as `/images/foo.png` to `<static_root>/images/foo.png`.
    ///
    /// The path must be non-empty, start with `/`, and stay inside the root.
    pub fn resolve(&self, src: &str) -> Result<PathBuf, ImageError> {
        let invalid = |message: &str| ImageError::Read {
            src: src.to_string(),
            path: PathBuf::from(src),
            message: message.to_string(),
        };

        let relative = src
            .strip_prefix('/')
            .ok_or_else(|| invalid("image path must be site-relative and start with '/'"))?;
        if relative.is_empty() {
            return Err(invalid("image path names no file"));
        }

        let mut resolved = self.static_root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("image path must not leave the static root"));
                }
            }
        }
        Ok(resolved)
    }

    /// Read the exact bytes of the file behind `src`.
    pub async fn load(&self, src: &str) -> Result<Vec<u8>, ImageError> {
        let path = self.resolve(src)?;
        let read_error = |message: String| ImageError::Read {
            src: src.to_string(),
            path: path.clone(),
            message,
        };

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| read_error(e.to_string()))?;
        if !metadata.is_file() {
            return Err(read_error("not a regular file".to_string()));
        }

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(read_error(format!(
                "file is {}MB, limit is {}MB",
                metadata.len() / (1024 * 1024),
                self.limits.max_file_size_mb
            )));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| read_error(e.to_string()))?;
        tracing::trace!("Read {} bytes from {:?}", bytes.len(), path);
        Ok(bytes)
    }
}
