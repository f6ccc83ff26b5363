//! CLI argument parsing using clap

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// loadentropy - Measure the iteration-order entropy of dataloader strategies
#[derive(Parser, Debug)]
#[command(name = "loadentropy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (CLI options override its values)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // === Benchmark Options ===
    /// Number of identifiers in the universe
    #[arg(short = 'u', long)]
    pub universe_size: Option<u64>,

    /// Batches collected per strategy
    #[arg(short = 'n', long)]
    pub n_batches: Option<usize>,

    /// Only run the named strategies (repeatable)
    #[arg(short = 's', long = "strategy", value_name = "NAME")]
    pub strategies: Vec<String>,

    /// Seed for reproducible runs
    #[arg(long, env = "LOADENTROPY_SEED")]
    pub seed: Option<u64>,

    // === Loader Options ===
    /// Identifiers per batch
    #[arg(short = 'b', long)]
    pub batch_size: Option<usize>,

    /// Rows per storage fragment for the simulated loader
    #[arg(long)]
    pub fragment_size: Option<u64>,

    // === Output Options ===
    /// Write a JSON report to this path
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Validate and print the configuration without running
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
        }

        if self.universe_size == Some(0) {
            anyhow::bail!("--universe-size must be greater than 0");
        }

        if self.n_batches == Some(0) {
            anyhow::bail!("--n-batches must be greater than 0");
        }

        if self.batch_size == Some(0) {
            anyhow::bail!("--batch-size must be greater than 0");
        }

        Ok(())
    }
}
