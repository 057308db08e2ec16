//! Full pixel decode with content-based format detection, limits, and timeout.

use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder as _, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::ImageError;

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory buffer on the blocking pool, bounded by the decode timeout.
    pub async fn decode_from_bytes(
        &self,
        bytes: Arc<[u8]>,
        src: &str,
    ) -> Result<DecodedImage, ImageError> {
        self.decode_with(bytes, src, Ok).await
    }

    /// Decode and then run `then` on the decoded image, as one blocking job.
    ///
    /// The decode timeout covers both steps.
    pub async fn decode_with<T, F>(
        &self,
        bytes: Arc<[u8]>,
        src: &str,
        then: F,
    ) -> Result<T, ImageError>
    where
        T: Send + 'static,
        F: FnOnce(DecodedImage) -> Result<T, ImageError> + Send + 'static,
    {
        let decoder = self.clone();
        let src_owned = src.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let job = tokio::task::spawn_blocking(move || {
            let decoded = Self::decode_bytes_sync(&bytes, &src_owned)?;
            decoder.check_dimensions(&decoded, &src_owned)?;
            then(decoded)
        });

        match timeout(timeout_duration, job).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ImageError::Thumbhash {
                src: src.to_string(),
                message: format!("decode task failed: {e}"),
            }),
            Err(_) => Err(ImageError::Thumbhash {
                src: src.to_string(),
                message: format!(
                    "decode timed out after {}ms",
                    self.limits.decode_timeout_ms
                ),
            }),
        }
    }

    /// Synchronous decode from bytes, with EXIF orientation applied.
    pub fn decode_bytes_sync(bytes: &[u8], src: &str) -> Result<DecodedImage, ImageError> {
        let error = |message: String| ImageError::Thumbhash {
            src: src.to_string(),
            message,
        };

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| error(format!("cannot detect image format: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| error("unsupported or unrecognized image format".to_string()))?;
        let mut decoder = reader
            .into_decoder()
            .map_err(|e| error(format!("decode failed: {e}")))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|e| error(format!("decode failed: {e}")))?;
        image.apply_orientation(orientation);

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(error(format!("image has a zero dimension ({width}x{height})")));
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }

    fn check_dimensions(&self, decoded: &DecodedImage, src: &str) -> Result<(), ImageError> {
        let max_dim = self.limits.max_image_dimension;
        if decoded.width > max_dim || decoded.height > max_dim {
            return Err(ImageError::Thumbhash {
                src: src.to_string(),
                message: format!(
                    "image is {}x{}, limit is {max_dim} on either side",
                    decoded.width, decoded.height
                ),
            });
        }
        Ok(())
    }
}
