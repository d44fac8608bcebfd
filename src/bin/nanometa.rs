use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nanometa::config::{ExtractConfig, DEFAULT_OUTPUT};

/// nanometa CLI
#[derive(Parser, Debug)]
#[command(name = "nanometa")]
#[command(version)]
#[command(about = "Extract metadata from nanopore sequencing runs in all subfolders", long_about = None)]
struct Cli {
    /// Folder (absolute path) holding one subfolder per sequencing run
    #[arg(long)]
    infolder: PathBuf,
    /// Report file, appended to
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Print the extracted table after writing it
    #[arg(long)]
    show: bool,
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
    tracing::debug!(?cli, "parsed CLI arguments");

    let cfg = ExtractConfig { output: cli.output, ..ExtractConfig::default() };
    let table = nanometa::extract_to_report(&cli.infolder, &cfg)
        .with_context(|| format!("extracting metadata from {}", cli.infolder.display()))?;

    if cli.show {
        std::env::set_var("POLARS_FMT_MAX_ROWS", "1000000");
        std::env::set_var("POLARS_FMT_STR_LEN", "100000");
        let df = nanometa::output::to_frame(&table)?;
        println!("{df}");
    }
    Ok(())
}
