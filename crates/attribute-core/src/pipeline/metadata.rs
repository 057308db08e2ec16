//! Header-level metadata extraction (format, dimensions, colour layout, orientation).

use exif::{In, Reader, Tag, Value};
use image::{ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::ImageError;
use crate::types::ImageMetadata;

/// Extracts structural metadata from raw image bytes without decoding pixels.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Parse the image header in `bytes`.
    ///
    /// The format is detected from the content, not from the file extension.
    /// `src` is only used to label errors.
    pub fn extract(bytes: &[u8], src: &str) -> Result<ImageMetadata, ImageError> {
        let error = |message: String| ImageError::Metadata {
            src: src.to_string(),
            message,
        };

        if bytes.is_empty() {
            return Err(error("file is empty".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| error(format!("cannot detect image format: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| error("unrecognized image format".to_string()))?;

        let decoder = reader
            .into_decoder()
            .map_err(|e| error(format!("invalid {} header: {e}", format_to_string(format))))?;
        let (width, height) = decoder.dimensions();
        let color = decoder.color_type();
        let channels = color.channel_count();

        Ok(ImageMetadata {
            format: format_to_string(format),
            width,
            height,
            orientation: Self::orientation(bytes),
            bit_depth: (channels > 0).then(|| color.bits_per_pixel() / u16::from(channels)),
            channels: Some(channels),
            has_alpha: Some(color.has_alpha()),
        })
    }

    /// EXIF orientation (1-8), if the container carries EXIF data.
    ///
    /// Missing or malformed EXIF is not an error.
    fn orientation(bytes: &[u8]) -> Option<u32> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .ok()?;
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| u32::from(x)),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
            .filter(|o| (1..=8).contains(o))
    }
}

/// Convert an ImageFormat to its identifier string.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => format
            .extensions_str()
            .first()
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageErrorKind;
    use image::{DynamicImage, RgbImage, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_png_dimensions_and_format() {
        let bytes = encode(
            DynamicImage::ImageRgba8(RgbaImage::new(10, 20)),
            ImageFormat::Png,
        );
        let meta = MetadataExtractor::extract(&bytes, "/img/test.png").unwrap();

        assert_eq!(meta.format, "png");
        assert_eq!(meta.width, 10);
        assert_eq!(meta.height, 20);
        assert_eq!(meta.bit_depth, Some(8));
        assert_eq!(meta.channels, Some(4));
        assert_eq!(meta.has_alpha, Some(true));
        assert_eq!(meta.orientation, None);
    }

    #[test]
    fn test_format_detected_by_content() {
        let bytes = encode(
            DynamicImage::ImageRgba8(RgbaImage::new(7, 3)),
            ImageFormat::Gif,
        );
        let meta = MetadataExtractor::extract(&bytes, "/img/misnamed.jpg").unwrap();
        assert_eq!(meta.format, "gif");
        assert_eq!((meta.width, meta.height), (7, 3));
    }

    #[test]
    fn test_jpeg_rgb_layout() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::new(32, 16)),
            ImageFormat::Jpeg,
        );
        let meta = MetadataExtractor::extract(&bytes, "/img/photo.jpg").unwrap();
        assert_eq!(meta.format, "jpeg");
        assert_eq!((meta.width, meta.height), (32, 16));
        assert_eq!(meta.has_alpha, Some(false));
    }

    #[test]
    fn test_exif_orientation_read_from_jpeg() {
        use crate::pipeline::test_images::{jpeg_bytes, with_exif_orientation};

        let bytes = with_exif_orientation(&jpeg_bytes(40, 20), 6);
        let meta = MetadataExtractor::extract(&bytes, "/phone.jpg").unwrap();
        assert_eq!(meta.format, "jpeg");
        assert_eq!((meta.width, meta.height), (40, 20));
        assert_eq!(meta.orientation, Some(6));
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = MetadataExtractor::extract(&[], "/img/empty.png").unwrap_err();
        assert_eq!(err.kind(), ImageErrorKind::Metadata);
        assert_eq!(err.src(), "/img/empty.png");
    }

    #[test]
    fn test_random_bytes_rejected() {
        let bytes: Vec<u8> = (0..256u32).map(|i| (i * 37 % 251) as u8 + 1).collect();
        let err = MetadataExtractor::extract(&bytes, "/img/noise.png").unwrap_err();
        assert_eq!(err.kind(), ImageErrorKind::Metadata);
    }

    #[test]
    fn test_truncated_png_rejected() {
        let bytes = encode(
            DynamicImage::ImageRgba8(RgbaImage::new(10, 20)),
            ImageFormat::Png,
        );
        let err = MetadataExtractor::extract(&bytes[..12], "/img/cut.png").unwrap_err();
        assert_eq!(err.kind(), ImageErrorKind::Metadata);
        assert!(err.to_string().contains("png"));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::new(40, 30)),
            ImageFormat::Png,
        );
        let a = MetadataExtractor::extract(&bytes, "/a.png").unwrap();
        let b = MetadataExtractor::extract(&bytes, "/a.png").unwrap();
        assert_eq!(a, b);
    }
}
