//! Error types for the attribute image enrichment pipeline.
//!
//! Errors are organized by stage so a failed content build names the image
//! reference that broke it and says whether the file could not be read, was
//! not a recognizable image, or could not be decoded and hashed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for attribute operations.
#[derive(Error, Debug)]
pub enum AttributeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Single-image pipeline errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Content document and patching errors
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failure while processing one image reference.
///
/// Every variant carries the `src` exactly as it appeared in the content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The source file is missing, unreadable, or not a valid reference
    #[error("Failed to read image {src} ({path}): {message}")]
    Read {
        src: String,
        path: PathBuf,
        message: String,
    },

    /// The bytes do not start with a recognizable image header
    #[error("Failed to get image metadata for {src}: {message}")]
    Metadata { src: String, message: String },

    /// Decode, resample, or hash encoding failed
    #[error("Failed to generate thumbhash for {src}: {message}")]
    Thumbhash { src: String, message: String },
}

/// Which pipeline stage an [`ImageError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageErrorKind {
    Read,
    Metadata,
    Thumbhash,
}

impl fmt::Display for ImageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Metadata => "metadata",
            Self::Thumbhash => "thumbhash",
        };
        f.write_str(name)
    }
}

impl ImageError {
    /// The image reference that failed.
    pub fn src(&self) -> &str {
        match self {
            Self::Read { src, .. } | Self::Metadata { src, .. } | Self::Thumbhash { src, .. } => {
                src
            }
        }
    }

    /// The stage that failed.
    pub fn kind(&self) -> ImageErrorKind {
        match self {
            Self::Read { .. } => ImageErrorKind::Read,
            Self::Metadata { .. } => ImageErrorKind::Metadata,
            Self::Thumbhash { .. } => ImageErrorKind::Thumbhash,
        }
    }
}

/// One failed image item inside a content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFailure {
    /// JSON pointer of the image record within the content tree
    pub pointer: String,
    /// Why it failed
    pub error: ImageError,
}

impl fmt::Display for ImageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = if self.pointer.is_empty() {
            "(root)"
        } else {
            &self.pointer
        };
        write!(f, "{pointer}: {}", self.error)
    }
}

/// Content document and patching errors.
#[derive(Error, Debug)]
pub enum ContentError {
    /// The content file could not be read
    #[error("Failed to read content file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The patched content could not be written back
    #[error("Failed to write content file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content file is not valid for its format
    #[error("Failed to parse content file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The patched content could not be written back in its format
    #[error("Failed to serialize content {path}: {message}")]
    Serialize { path: PathBuf, message: String },

    /// The file extension is not a supported content format
    #[error("Unsupported content format for {path}: {extension}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// One or more image items failed; the record was left untouched
    #[error("{} image item(s) failed: {}", .0.len(), join_failures(.0))]
    Images(Vec<ImageFailure>),
}

fn join_failures(failures: &[ImageFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for attribute results.
pub type Result<T> = std::result::Result<T, AttributeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_src_and_path() {
        let err = ImageError::Read {
            src: "/img/missing.png".into(),
            path: PathBuf::from("public/img/missing.png"),
            message: "No such file or directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/img/missing.png"));
        assert!(msg.contains("public/img/missing.png"));
        assert_eq!(err.kind(), ImageErrorKind::Read);
    }

    #[test]
    fn test_images_error_lists_every_failure() {
        let err = ContentError::Images(vec![
            ImageFailure {
                pointer: "/hero".into(),
                error: ImageError::Metadata {
                    src: "/a.png".into(),
                    message: "unrecognized header".into(),
                },
            },
            ImageFailure {
                pointer: "/gallery/1".into(),
                error: ImageError::Thumbhash {
                    src: "/b.png".into(),
                    message: "decode failed".into(),
                },
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 image item(s) failed"));
        assert!(msg.contains("/hero"));
        assert!(msg.contains("/gallery/1"));
        assert!(msg.contains("/b.png"));
    }

    #[test]
    fn test_root_pointer_display() {
        let failure = ImageFailure {
            pointer: String::new(),
            error: ImageError::Metadata {
                src: "/x.png".into(),
                message: "bad".into(),
            },
        };
        assert!(failure.to_string().starts_with("(root):"));
    }
}
