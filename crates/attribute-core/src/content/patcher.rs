//! Enriching every image item of a content record in place.
//!
//! Patching happens in three steps: collect the image items, process each
//! distinct `src` concurrently (bounded by a semaphore), then write the
//! results back. Failures are collected across all items; if any item fails
//! the record is returned untouched together with the full list of failures.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error::{ContentError, ImageError, ImageFailure};
use crate::pipeline::{ImageProcessor, ProcessOptions};
use crate::types::ProcessedImage;

use super::node::{record_src, ContentNode, METADATA_KEY, THUMBHASH_KEY};

/// Options for a patch pass.
#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Maximum images processed concurrently
    pub parallel: usize,
    /// Only write `metadata`, never decode or hash
    pub skip_thumbhash: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            parallel: crate::config::default_parallelism(),
            skip_thumbhash: false,
        }
    }
}

impl PatchOptions {
    /// Options matching the processing section of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            parallel: config.processing.parallel_workers,
            skip_thumbhash: !config.thumbhash.enabled,
        }
    }
}

/// Summary of a successful patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Image items that were enriched
    pub images: usize,
    /// Distinct `src` values that were processed
    pub unique_sources: usize,
}

/// Walks content records and enriches their image items.
#[derive(Clone)]
pub struct ContentPatcher {
    processor: Arc<ImageProcessor>,
    options: PatchOptions,
}

impl ContentPatcher {
    pub fn new(processor: Arc<ImageProcessor>, options: PatchOptions) -> Self {
        Self { processor, options }
    }

    /// Enrich every image item in `root`.
    ///
    /// On success each image record gains `metadata` (and `thumbhash` unless
    /// skipped). On failure `root` is unchanged and the error lists every
    /// failed item with its pointer.
    pub async fn patch(&self, root: &mut ContentNode) -> Result<PatchReport, ContentError> {
        let refs = root.image_refs();
        if refs.is_empty() {
            return Ok(PatchReport::default());
        }

        let mut sources: Vec<String> = refs.iter().map(|r| r.src.clone()).collect();
        sources.sort();
        sources.dedup();
        tracing::debug!(
            "Found {} image item(s), {} distinct source(s)",
            refs.len(),
            sources.len()
        );

        let results = self.process_sources(&sources).await;

        let failures: Vec<ImageFailure> = refs
            .iter()
            .filter_map(|r| match results.get(&r.src) {
                Some(Err(error)) => Some(ImageFailure {
                    pointer: r.pointer.clone(),
                    error: error.clone(),
                }),
                _ => None,
            })
            .collect();
        if !failures.is_empty() {
            for failure in &failures {
                tracing::error!("Image item failed: {}", failure);
            }
            return Err(ContentError::Images(failures));
        }

        let patches = build_patches(results)?;
        let mut images = 0usize;
        root.visit_images_mut(|_, record| {
            let patch = record_src(record).and_then(|src| patches.get(src));
            if let Some((metadata, thumbhash)) = patch {
                record.insert(METADATA_KEY.to_string(), metadata.clone());
                match thumbhash {
                    Some(thumbhash) => {
                        record.insert(
                            THUMBHASH_KEY.to_string(),
                            ContentNode::from(thumbhash.as_str()),
                        );
                    }
                    // No hash this run means no hash on the record.
                    None => {
                        record.remove(THUMBHASH_KEY);
                    }
                }
                images += 1;
            }
        });

        Ok(PatchReport {
            images,
            unique_sources: sources.len(),
        })
    }

    /// Process each source on its own task, at most `parallel` at a time.
    async fn process_sources(
        &self,
        sources: &[String],
    ) -> HashMap<String, Result<ProcessedImage, ImageError>> {
        let semaphore = Arc::new(Semaphore::new(self.options.parallel.max(1)));
        let options = ProcessOptions {
            skip_thumbhash: self.options.skip_thumbhash,
        };
        let mut handles = Vec::with_capacity(sources.len());

        for src in sources {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            let options = options.clone();
            let task_src = src.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| ImageError::Thumbhash {
                    src: task_src.clone(),
                    message: format!("processing slot unavailable: {e}"),
                })?;
                processor.process_with_options(&task_src, &options).await
            });
            handles.push((src.clone(), handle));
        }

        let mut results = HashMap::with_capacity(handles.len());
        for (src, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Image task for {} panicked: {e}", src);
                    Err(ImageError::Thumbhash {
                        src: src.clone(),
                        message: format!("processing task failed: {e}"),
                    })
                }
            };
            results.insert(src, result);
        }
        results
    }
}

type Patch = (ContentNode, Option<String>);

/// Turn processing results into ready-to-insert nodes, before touching the record.
fn build_patches(
    results: HashMap<String, Result<ProcessedImage, ImageError>>,
) -> Result<BTreeMap<String, Patch>, ContentError> {
    results
        .into_iter()
        .filter_map(|(src, result)| result.ok().map(|processed| (src, processed)))
        .map(|(src, processed)| {
            let metadata = serde_json::to_value(&processed.metadata).map_err(|e| {
                ContentError::Serialize {
                    path: src.clone().into(),
                    message: e.to_string(),
                }
            })?;
            Ok((src, (ContentNode::from(metadata), processed.thumbhash)))
        })
        .collect()
}
