//! morefs: inspect how paths and glob patterns resolve on disk.
//!
//! ```bash
//! morefs --stats "src/*" README.md "tests/**"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use morefs_io_fs::{FileSet, FsGlobResolver, SpecGlobOptions};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "morefs", version, about = "Resolve paths and glob patterns")]
struct Cli {
    /// Print the file/dir/missing classification of FILES as JSON.
    #[arg(short, long)]
    stats: bool,

    /// Let wildcards match names starting with `.`.
    #[arg(long)]
    dot: bool,

    /// Match patterns case-insensitively.
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Debug logging to stderr (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,

    /// Literal paths or glob patterns.
    files: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if !cli.stats {
        return Ok(());
    }

    let resolver = FsGlobResolver::new(SpecGlobOptions {
        if_case_sensitive: !cli.ignore_case,
        if_dot: cli.dot,
        ..SpecGlobOptions::default()
    });
    let file_set =
        FileSet::with_resolver(&cli.files, resolver).context("Failed to classify inputs")?;
    tracing::info!(
        n_files = file_set.files().len(),
        n_dirs = file_set.dirs().len(),
        n_missing = file_set.not_existing().len(),
        "classification done"
    );

    let txt = serde_json::to_string_pretty(&file_set).context("Failed to serialize result")?;
    println!("{txt}");
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(build_env_filter(verbose, rust_log.as_deref())?)
        .init();
    Ok(())
}

/// A non-empty `RUST_LOG` wins; otherwise `-v` picks debug over warn.
fn build_env_filter(verbose: bool, rust_log: Option<&str>) -> Result<EnvFilter> {
    match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid RUST_LOG value: {directives}")),
        None => {
            let directive = if verbose { "morefs=debug" } else { "morefs=warn" };
            Ok(EnvFilter::new(directive))
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, build_env_filter};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_stats_with_patterns() {
        let cli = Cli::parse_from(["morefs", "-s", "src/*", "README.md"]);
        assert!(cli.stats);
        assert!(!cli.dot);
        assert_eq!(cli.files, vec!["src/*", "README.md"]);
    }

    #[test]
    fn rust_log_overrides_verbosity_flag() {
        let env_filter = build_env_filter(false, Some("morefs=trace")).expect("filter");
        assert_eq!(env_filter.to_string(), "morefs=trace");

        let env_filter = build_env_filter(true, Some("morefs_io_fs=info")).expect("filter");
        assert_eq!(env_filter.to_string(), "morefs_io_fs=info");
    }

    #[test]
    fn verbosity_flag_applies_without_rust_log() {
        let env_filter = build_env_filter(false, None).expect("filter");
        assert_eq!(env_filter.to_string(), "morefs=warn");

        let env_filter = build_env_filter(true, Some("  ")).expect("filter");
        assert_eq!(env_filter.to_string(), "morefs=debug");
    }
}
