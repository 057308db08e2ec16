//! Attribute CLI - enrich content records with image metadata and thumbhashes.
//!
//! Attribute reads content files (JSON or TOML), finds every record with a
//! `src` image path, and writes each image's `metadata` and `thumbhash` back
//! onto the record. Images are resolved against a static asset root.
//!
//! # Usage
//!
//! ```bash
//! # Transform one content file and print the result
//! attribute process content/home.json --root public
//!
//! # Rewrite every content file under a directory in place
//! attribute process content/ --root public --in-place
//!
//! # Look at a single image
//! attribute inspect /images/hero.png --root public
//!
//! # View configuration
//! attribute config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Attribute - image metadata and thumbhash enrichment for content records.
#[derive(Parser, Debug)]
#[command(name = "attribute")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "ATTRIBUTE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Add image metadata and thumbhashes to content files
    Process(cli::process::ProcessArgs),

    /// Process a single image reference and print the result
    Inspect(cli::inspect::InspectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(attribute_core::Config::default_path);
    let config = match &cli.config {
        // An explicitly requested config must load.
        Some(path) => attribute_core::Config::load_from(path).map_err(|e| {
            anyhow::anyhow!("Failed to load config {}: {e}", path.display())
        })?,
        None => match attribute_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `attribute config path`."
                );
                attribute_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Attribute v{}", attribute_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Inspect(args) => cli::inspect::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
    }
}
