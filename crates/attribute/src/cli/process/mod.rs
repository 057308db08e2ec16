//! The `attribute process` command for enriching content files.

mod batch;
pub mod types;

pub use types::OutputFormat;

use attribute_core::{
    Config, ContentDiscovery, ContentPatcher, ImageProcessor, OutputFormat as CoreOutputFormat,
    PatchOptions,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use super::{apply_thumbhash_overrides, resolve_static_root};
use batch::process_batch;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Content file or directory to process
    #[arg(required = true)]
    pub input: PathBuf,

    /// Static asset root that image `src` paths resolve against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to output.format from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of images processed concurrently
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Only write metadata, skip decoding and thumbhash
    #[arg(long)]
    pub dimensions_only: bool,

    /// Longest side of the thumbhash input image
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_size: Option<u32>,

    /// Rewrite each content file instead of emitting output
    #[arg(long, conflicts_with_all = ["output", "format"])]
    pub in_place: bool,
}

/// Manual Default impl for constructing ProcessArgs outside of clap.
impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            root: None,
            output: None,
            format: None,
            parallel: None,
            dimensions_only: false,
            max_size: None,
            in_place: false,
        }
    }
}

/// Everything needed to run a batch, assembled by `setup`.
pub(crate) struct ProcessContext {
    pub patcher: ContentPatcher,
    pub discovery: ContentDiscovery,
    pub output_format: CoreOutputFormat,
    pub pretty: bool,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup(&args, config)?;

    let files = ctx.discovery.discover(&args.input);
    if files.is_empty() && args.input.is_file() {
        anyhow::bail!(
            "Unsupported content file: {:?}\n\n  Hint: Supported extensions are {}.",
            args.input,
            ctx.discovery.extensions().join(", ")
        );
    }
    if files.is_empty() {
        tracing::warn!("No supported content files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} content file(s) to process", files.len());

    let summary = process_batch(&ctx, &args, files).await?;
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} content file(s) failed",
            summary.failed,
            summary.total()
        );
    }
    Ok(())
}

/// Validate input, apply CLI overrides to the config, and build the patcher.
fn setup(args: &ProcessArgs, mut config: Config) -> anyhow::Result<ProcessContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    apply_thumbhash_overrides(&mut config, args.dimensions_only, args.max_size);
    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.processing.parallel_workers = parallel;
    }

    let root = resolve_static_root(args.root.as_deref(), &config)?;
    tracing::debug!("Static root: {}", root.display());

    let output_format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown output.format {:?} in config, using json",
                config.output.format
            );
            CoreOutputFormat::Json
        }),
    };

    let processor = ImageProcessor::with_static_root(&config, &root);
    let patcher = ContentPatcher::new(Arc::new(processor), PatchOptions::from_config(&config));

    Ok(ProcessContext {
        patcher,
        discovery: ContentDiscovery::new(&config.processing),
        output_format,
        pretty: config.output.pretty,
    })
}
