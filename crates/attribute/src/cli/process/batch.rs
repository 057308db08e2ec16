//! Batch processing: per-file patching with progress, output, and a summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use attribute_core::{
    ContentDocument, ContentError, ContentOutput, ContentPatcher, OutputFormat, OutputWriter,
};

use super::{ProcessArgs, ProcessContext};

/// Counts reported after a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub images: u64,
}

impl BatchSummary {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Patch every file, then write them back in place or emit `{ path, content }` records.
///
/// A failed file never stops the batch; it is logged and counted.
pub async fn process_batch(
    ctx: &ProcessContext,
    args: &ProcessArgs,
    files: Vec<PathBuf>,
) -> anyhow::Result<BatchSummary> {
    let progress = create_progress_bar(files.len() as u64);
    let start_time = Instant::now();
    let mut summary = BatchSummary::default();

    let mut writer = if args.in_place {
        None
    } else {
        Some(OutputWriter::new(
            open_output(args.output.as_deref())?,
            ctx.output_format,
            ctx.pretty,
        ))
    };
    let stream = ctx.output_format == OutputFormat::JsonLines;
    // JSON output is an array for directories and a single object for one file.
    let mut collected = Vec::new();

    for path in files {
        match patch_file(&ctx.patcher, &path, args.in_place).await {
            Ok((output, images)) => {
                summary.succeeded += 1;
                summary.images += images as u64;
                if let Some(output) = output {
                    match writer.as_mut() {
                        Some(writer) if stream => writer.write(&output)?,
                        _ => collected.push(output),
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed: {} - {}", path.display(), e);
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} files/sec", summary.total() as f64 / elapsed));
        }
    }

    if let Some(writer) = writer.as_mut() {
        if !stream {
            if args.input.is_file() && collected.len() == 1 {
                writer.write(&collected[0])?;
            } else {
                writer.write_all(&collected)?;
            }
        }
        writer.flush()?;
        if let Some(output_path) = &args.output {
            tracing::info!("Output written to {:?}", output_path);
        }
    }

    progress.finish_and_clear();
    print_summary(&summary, start_time.elapsed());

    Ok(summary)
}

/// Load, patch, and either save a file or return its output record.
async fn patch_file(
    patcher: &ContentPatcher,
    path: &Path,
    in_place: bool,
) -> Result<(Option<ContentOutput>, usize), ContentError> {
    let mut doc = ContentDocument::load(path)?;
    let report = patcher.patch(&mut doc.root).await?;
    tracing::debug!(
        "Patched {} ({} image item(s), {} source(s))",
        path.display(),
        report.images,
        report.unique_sources
    );

    if in_place {
        if report.images > 0 {
            doc.save()?;
        }
        return Ok((None, report.images));
    }

    Ok((
        Some(ContentOutput {
            path: doc.path,
            content: doc.root,
        }),
        report.images,
    ))
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

/// Create a progress bar; hidden for a single file.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    if total <= 1 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table to stderr.
fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("    Images:       {:>8}", summary.images);
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}
