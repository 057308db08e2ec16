//! Thumbhash placeholder generation.
//!
//! The image is resampled so its longer edge equals `max_size` (aspect ratio
//! preserved, both sides floored), and the RGBA pixels of that small image are
//! encoded with the thumbhash algorithm. The binary hash is returned as
//! standard padded base64, ready to be stored inline in content.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView};

use crate::config::ThumbhashConfig;
use crate::error::ImageError;

use super::decode::ImageDecoder;

/// Default bounding size for the resampled image.
pub const DEFAULT_MAX_SIZE: u32 = 100;

/// Largest input the thumbhash encoder accepts on either side.
pub const MAX_ENCODER_SIZE: u32 = 100;

/// Resampling filter applied before encoding.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Generates thumbhash strings from images.
#[derive(Debug, Clone)]
pub struct ThumbhashGenerator {
    max_size: u32,
}

impl Default for ThumbhashGenerator {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl ThumbhashGenerator {
    /// Create a generator from configuration.
    pub fn new(config: &ThumbhashConfig) -> Self {
        Self::with_max_size(config.max_size)
    }

    /// Create a generator with an explicit bounding size (clamped to 1..=100).
    pub fn with_max_size(max_size: u32) -> Self {
        Self {
            max_size: max_size.clamp(1, MAX_ENCODER_SIZE),
        }
    }

    /// The bounding size in pixels.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Generate the base64 thumbhash for a decoded image.
    pub fn generate(&self, image: &DynamicImage, src: &str) -> Result<String, ImageError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Thumbhash {
                src: src.to_string(),
                message: format!("image has a zero dimension ({width}x{height})"),
            });
        }

        let (resized_width, resized_height) = bounded_dimensions(width, height, self.max_size);
        let rgba = image.to_rgba8();
        let resized = imageops::resize(&rgba, resized_width, resized_height, RESAMPLE_FILTER);

        let hash = ::thumbhash::rgba_to_thumb_hash(
            resized.width() as usize,
            resized.height() as usize,
            resized.as_raw(),
        );
        if hash.is_empty() {
            return Err(ImageError::Thumbhash {
                src: src.to_string(),
                message: "encoder produced an empty hash".to_string(),
            });
        }

        tracing::trace!(
            "Thumbhash for {} from {}x{} resampled to {}x{}",
            src,
            width,
            height,
            resized_width,
            resized_height
        );
        Ok(BASE64.encode(hash))
    }

    /// Decode `bytes` and generate the thumbhash synchronously.
    pub fn generate_from_bytes(&self, bytes: &[u8], src: &str) -> Result<String, ImageError> {
        let decoded = ImageDecoder::decode_bytes_sync(bytes, src)?;
        self.generate(&decoded.image, src)
    }
}

/// Scale `width`x`height` so the longer edge equals `max_size`.
///
/// Equivalent to flooring both sides after multiplying by
/// `min(max_size / width, max_size / height)`, computed in integers so the
/// longer edge lands exactly on `max_size`. Sides that would floor to zero
/// are kept at one pixel.
pub fn bounded_dimensions(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let longer = u64::from(width.max(height).max(1));
    let scale = |side: u32| {
        let scaled = u64::from(side) * u64::from(max_size) / longer;
        (scaled as u32).max(1)
    };
    (scale(width), scale(height))
}
