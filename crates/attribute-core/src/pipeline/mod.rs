//! Single-image processing pipeline.
//!
//! - **loader**: Resolve site-relative `src` paths and read file bytes
//! - **metadata**: Parse format, dimensions, and orientation from the header
//! - **decode**: Full pixel decode with limits and timeout
//! - **thumbhash**: Resample and encode a base64 thumbhash placeholder
//! - **processor**: Orchestrates the stages for one image

pub mod decode;
pub mod loader;
pub mod metadata;
pub mod processor;
pub mod thumbhash;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use loader::ImageLoader;
pub use metadata::MetadataExtractor;
pub use processor::{ImageProcessor, ProcessOptions};
pub use thumbhash::{bounded_dimensions, ThumbhashGenerator};
