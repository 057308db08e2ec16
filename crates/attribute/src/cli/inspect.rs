//! The `attribute inspect` command: run one image reference through the pipeline.

use attribute_core::{Config, ImageItem, ImageProcessor, ProcessOptions};
use clap::Args;
use std::path::PathBuf;

use super::{apply_thumbhash_overrides, resolve_static_root};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Site-relative image path, e.g. /images/hero.png
    #[arg(required = true)]
    pub src: String,

    /// Static asset root that `src` resolves against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Only extract metadata, skip decoding and thumbhash
    #[arg(long)]
    pub dimensions_only: bool,

    /// Longest side of the thumbhash input image
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_size: Option<u32>,
}

/// Execute the inspect command.
pub async fn execute(args: InspectArgs, mut config: Config) -> anyhow::Result<()> {
    apply_thumbhash_overrides(&mut config, args.dimensions_only, args.max_size);
    let root = resolve_static_root(args.root.as_deref(), &config)?;

    let item = inspect(&config, &root, &args.src).await?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

async fn inspect(config: &Config, root: &std::path::Path, src: &str) -> anyhow::Result<ImageItem> {
    let processor = ImageProcessor::with_static_root(config, root);
    let options = ProcessOptions {
        skip_thumbhash: !config.thumbhash.enabled,
    };
    let processed = processor.process_with_options(src, &options).await?;
    Ok(ImageItem::new(src).with_processed(processed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};

    #[tokio::test]
    async fn test_inspect_png() {
        let dir = tempfile::tempdir().unwrap();
        DynamicImage::new_rgb8(10, 20)
            .save_with_format(dir.path().join("tall.png"), ImageFormat::Png)
            .unwrap();

        let item = inspect(&Config::default(), dir.path(), "/tall.png").await.unwrap();
        let metadata = item.metadata.unwrap();
        assert_eq!(item.src, "/tall.png");
        assert_eq!((metadata.width, metadata.height), (10, 20));
        assert_eq!(metadata.format, "png");
        assert!(item.thumbhash.is_some());
    }

    #[tokio::test]
    async fn test_inspect_dimensions_only() {
        let dir = tempfile::tempdir().unwrap();
        DynamicImage::new_rgb8(4, 4)
            .save_with_format(dir.path().join("a.png"), ImageFormat::Png)
            .unwrap();
        let mut config = Config::default();
        apply_thumbhash_overrides(&mut config, true, None);

        let item = inspect(&config, dir.path(), "/a.png").await.unwrap();
        assert!(item.metadata.is_some());
        assert!(item.thumbhash.is_none());
    }

    #[tokio::test]
    async fn test_inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = inspect(&Config::default(), dir.path(), "/missing.png")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/missing.png"));
    }
}
