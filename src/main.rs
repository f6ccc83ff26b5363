//! loadentropy CLI entry point

use anyhow::{Context, Result};
use loadentropy::config::{cli::Cli, toml::load_config, validator::validate_config};
use loadentropy::harness::EntropyBenchmark;
use loadentropy::output::{json, text};
use loadentropy::source::simulated::SimulatedDataset;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    init_logging(cli.verbose);

    println!("loadentropy v{}", env!("CARGO_PKG_VERSION"));
    println!("Dataloader iteration-order entropy measurement");
    println!();

    let config = load_config(&cli)?;
    validate_config(&config).context("Configuration validation failed")?;

    text::print_configuration(&config);

    if cli.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let mut dataset = SimulatedDataset::new(config.benchmark.universe_size)
        .with_fragment_size(config.loader.fragment_size);
    if let Some(seed) = config.benchmark.seed {
        dataset = dataset.with_seed(seed);
    }

    let mut bench = EntropyBenchmark::from_config(dataset, &config);
    let results = bench.benchmark_all_strategies(config.benchmark.n_batches);

    text::print_results(&results, &config.strategies);

    if let Some(path) = &config.output.json_path {
        let report = json::build_json_report(&config, bench.estimator().baselines(), &results);
        json::write_json_report(path, &report, true)
            .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;
    }

    println!();
    println!("Entropy measurement complete");
    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "loadentropy=debug" } else { "loadentropy=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
