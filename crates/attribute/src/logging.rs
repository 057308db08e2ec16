//! Logging initialization.
//!
//! Logs always go to stderr; stdout carries transformed content.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pick the default filter directive for a configured level.
///
/// `verbose` wins over the config; unknown levels fall back to "info".
fn default_level(level: &str, verbose: bool) -> &'static str {
    if verbose {
        return "debug";
    }
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Initialize the logging subsystem.
///
/// The RUST_LOG environment variable overrides `level` when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section, with CLI overrides.
pub fn init_from_config(
    config: &attribute_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = default_level(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}
