//! Pipeline orchestration - wires together all processing stages.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ImageError;
use crate::types::ProcessedImage;

use super::decode::ImageDecoder;
use super::loader::ImageLoader;
use super::metadata::MetadataExtractor;
use super::thumbhash::ThumbhashGenerator;

/// Options for controlling image processing behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Extract metadata only, without decoding pixels or hashing
    pub skip_thumbhash: bool,
}

/// Processes one image reference at a time: load, extract metadata, hash.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    loader: ImageLoader,
    decoder: ImageDecoder,
    thumbhash_gen: ThumbhashGenerator,
    thumbhash_enabled: bool,
}

impl ImageProcessor {
    /// Create a processor whose loader resolves against `config.static_root()`.
    pub fn new(config: &Config) -> Self {
        Self::with_static_root(config, config.static_root())
    }

    /// Create a processor with an explicit static asset root.
    pub fn with_static_root(config: &Config, static_root: impl AsRef<Path>) -> Self {
        Self {
            loader: ImageLoader::new(static_root.as_ref(), config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            thumbhash_gen: ThumbhashGenerator::new(&config.thumbhash),
            thumbhash_enabled: config.thumbhash.enabled,
        }
    }

    /// The loader used to resolve `src` paths.
    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Whether thumbhashes are generated unless a call opts out.
    pub fn thumbhash_enabled(&self) -> bool {
        self.thumbhash_enabled
    }

    /// Process the image behind `src` with default options.
    pub async fn process(&self, src: &str) -> Result<ProcessedImage, ImageError> {
        self.process_with_options(src, &ProcessOptions::default())
            .await
    }

    /// Process the image behind `src` with custom options.
    pub async fn process_with_options(
        &self,
        src: &str,
        options: &ProcessOptions,
    ) -> Result<ProcessedImage, ImageError> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {}", src);

        let bytes = self.loader.load(src).await?;
        let load_time = start.elapsed();
        tracing::trace!("  Load: {:?}", load_time);

        let processed = self.process_bytes(bytes, src, options).await?;

        tracing::debug!(
            "Processed {} in {:?} ({}x{} {})",
            src,
            start.elapsed(),
            processed.metadata.width,
            processed.metadata.height,
            processed.metadata.format
        );
        Ok(processed)
    }

    /// Run metadata extraction and thumbhash generation over already-loaded bytes.
    ///
    /// Header parsing runs concurrently with the decode-and-hash job over the same buffer.
    pub async fn process_bytes(
        &self,
        bytes: Vec<u8>,
        src: &str,
        options: &ProcessOptions,
    ) -> Result<ProcessedImage, ImageError> {
        let bytes: Arc<[u8]> = Arc::from(bytes);

        if options.skip_thumbhash || !self.thumbhash_enabled {
            let metadata = MetadataExtractor::extract(&bytes, src)?;
            return Ok(ProcessedImage {
                metadata,
                thumbhash: None,
            });
        }

        // Decode and hash run together on the blocking pool, under the decode timeout.
        let stage_start = std::time::Instant::now();
        let generator = self.thumbhash_gen.clone();
        let hash_src = src.to_string();
        let (metadata, thumbhash) = tokio::join!(
            async { MetadataExtractor::extract(&bytes, src) },
            self.decoder.decode_with(bytes.clone(), src, move |decoded| {
                generator.generate(&decoded.image, &hash_src)
            })
        );
        let metadata = metadata?;
        let thumbhash = thumbhash?;
        tracing::trace!("  Metadata + decode + thumbhash: {:?}", stage_start.elapsed());

        Ok(ProcessedImage {
            metadata,
            thumbhash: Some(thumbhash),
        })
    }
}
