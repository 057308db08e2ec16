//! Core data types for image items and their derived data.

use serde::{Deserialize, Serialize};

/// One image reference inside content data, plus what the pipeline derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    /// Site-relative path of the image file (e.g. "/images/hero.png")
    pub src: String,

    /// Structural description of the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ImageMetadata>,

    /// Base64-encoded thumbhash placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbhash: Option<String>,
}

impl ImageItem {
    /// An unprocessed item.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            metadata: None,
            thumbhash: None,
        }
    }

    /// Attach the results of processing.
    pub fn with_processed(mut self, processed: ProcessedImage) -> Self {
        self.metadata = Some(processed.metadata);
        self.thumbhash = processed.thumbhash;
        self
    }
}

/// Header-level description of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Detected format ("png", "jpeg", "webp", "gif", ...)
    pub format: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// EXIF orientation (1-8) if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u32>,

    /// Bits per channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u16>,

    /// Number of colour channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,

    /// Whether the pixel format has an alpha channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_alpha: Option<bool>,
}

/// Everything the pipeline derives from one image file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImage {
    pub metadata: ImageMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbhash: Option<String>,
}
