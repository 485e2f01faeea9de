//! Signalboard CLI: run the positional signal batch and check configs.
//!
//! Commands:
//! - `run`: fetch market data, assemble one signal per instrument and write
//!   the entry document atomically
//! - `check-config`: parse and validate a TOML config, print it resolved

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use signalboard_core::domain::SignalSide;
use signalboard_runner::{
    build_gateway, write_document, BatchOutcome, EntryDocument, SignalAssembler, SignalConfig,
};

#[derive(Parser)]
#[command(
    name = "signalboard",
    about = "Signalboard CLI: crypto positional entry signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signal batch and write the entry document.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path, overriding the config's `output`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Comma-separated instruments to process instead of the configured list.
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },
    /// Parse and validate a config file, then print it with defaults filled in.
    CheckConfig {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            only,
        } => run_signals(config.as_deref(), output, only),
        Commands::CheckConfig { config } => check_config(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<SignalConfig> {
    let config = match path {
        Some(path) => SignalConfig::from_file(path)?,
        None => SignalConfig::default(),
    };
    Ok(config)
}

fn run_signals(config_path: Option<&Path>, output: Option<PathBuf>, only: Vec<String>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(output) = output {
        config.output = output;
    }
    if !only.is_empty() {
        config.instruments = only.into_iter().map(|s| s.trim().to_string()).collect();
    }
    config.validate()?;

    let instruments = config.instruments()?;
    if instruments.is_empty() {
        bail!("no instruments to process");
    }

    let mut gateway = build_gateway(&config).context("failed to set up market sources")?;
    info!(
        sources = ?gateway.source_names(),
        instruments = instruments.len(),
        "starting signal batch"
    );
    gateway.load_catalogs();

    let output_path = config.output.clone();
    let assembler = SignalAssembler::new(gateway, config)?;
    let outcome = assembler.run_batch(&instruments, None);

    let doc = EntryDocument::from_outcome(&outcome);
    write_document(&doc, &output_path)?;

    print_summary(&outcome, &output_path);
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = SignalConfig::from_file(path)?;
    config.validate()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_summary(outcome: &BatchOutcome, path: &Path) {
    let count = |side: SignalSide| outcome.records.iter().filter(|r| r.side == side).count();

    println!();
    println!("=== Signal Batch Summary ===");
    println!(
        "Processed:    {}/{}",
        outcome.processed(),
        outcome.total_instruments
    );
    println!("LONG:         {}", count(SignalSide::Long));
    println!("SHORT:        {}", count(SignalSide::Short));
    println!("No entry:     {}", count(SignalSide::NoEntry));
    println!("No data:      {}", count(SignalSide::NoData));
    println!("Updated at:   {}", outcome.finished_at.to_rfc3339());
    println!("Written to:   {}", path.display());
}
