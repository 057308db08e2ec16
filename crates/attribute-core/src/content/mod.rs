//! Content records: parsing, discovery, and image-item patching.

pub mod discovery;
pub mod document;
pub mod node;
pub mod patcher;

pub use discovery::ContentDiscovery;
pub use document::{ContentDocument, DocumentFormat};
pub use node::{ContentNode, ImageRef, Record};
pub use patcher::{ContentPatcher, PatchOptions, PatchReport};
