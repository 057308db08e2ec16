//! Attribute Core - build-time image enrichment for content records.
//!
//! Content records (pages, data files) reference images by site-relative
//! path: `{ "src": "/images/hero.png" }`. This library finds every such image
//! item, reads the file from the static asset root, and writes back:
//!
//! - `metadata`: format, width, height, and header-level details
//! - `thumbhash`: a base64 thumbhash used as a blurred placeholder
//!
//! # Architecture
//!
//! ```text
//! ContentPatcher → ImageLoader → MetadataExtractor ∥ (ImageDecoder → ThumbhashGenerator) → write-back
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use attribute_core::{Config, ContentDocument, ContentPatcher, ImageProcessor, PatchOptions};
//!
//! #[tokio::main]
//! async fn main() -> attribute_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = Arc::new(ImageProcessor::new(&config));
//!     let patcher = ContentPatcher::new(processor, PatchOptions::from_config(&config));
//!
//!     let mut doc = ContentDocument::load("content/home.json".as_ref())?;
//!     patcher.patch(&mut doc.root).await?;
//!     doc.save()?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod content;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use content::{
    ContentDiscovery, ContentDocument, ContentNode, ContentPatcher, PatchOptions, PatchReport,
};
pub use error::{
    AttributeError, ConfigError, ContentError, ImageError, ImageErrorKind, ImageFailure, Result,
};
pub use output::{ContentOutput, OutputFormat, OutputWriter};
pub use pipeline::{ImageProcessor, ProcessOptions};
pub use types::{ImageItem, ImageMetadata, ProcessedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
