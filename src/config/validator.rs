//! Configuration validation

use super::*;
use crate::harness::RANDOM_STRATEGY;
use anyhow::Result;
use std::collections::HashSet;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_benchmark(&config.benchmark)?;
    validate_loader(&config.loader)?;
    validate_strategies(&config.strategies, &config.loader)?;

    Ok(())
}

/// Validate benchmark run settings
pub fn validate_benchmark(benchmark: &BenchmarkConfig) -> Result<()> {
    if benchmark.universe_size == 0 {
        anyhow::bail!("universe_size must be greater than 0");
    }

    if benchmark.n_batches == 0 {
        anyhow::bail!("n_batches must be greater than 0");
    }

    Ok(())
}

/// Validate loader-wide settings
pub fn validate_loader(loader: &LoaderConfig) -> Result<()> {
    if loader.batch_size == 0 {
        anyhow::bail!("batch_size must be greater than 0");
    }

    if loader.n_epochs == 0 {
        anyhow::bail!("n_epochs must be greater than 0");
    }

    if loader.fragment_size == 0 {
        anyhow::bail!("fragment_size must be greater than 0");
    }

    if loader.batch_size != crate::estimator::BASELINE_BATCH_SIZE {
        tracing::warn!(
            batch_size = loader.batch_size,
            reference = crate::estimator::BASELINE_BATCH_SIZE,
            "loader batch size differs from the random reference batch size"
        );
    }

    Ok(())
}

/// Validate the strategy list
pub fn validate_strategies(strategies: &[StrategyConfig], loader: &LoaderConfig) -> Result<()> {
    if strategies.is_empty() {
        anyhow::bail!("At least one strategy must be configured");
    }

    let mut names = HashSet::new();
    for (i, strategy) in strategies.iter().enumerate() {
        if strategy.name.trim().is_empty() {
            anyhow::bail!("Strategy {} has an empty name", i);
        }

        if strategy.name == RANDOM_STRATEGY {
            anyhow::bail!(
                "Strategy name '{}' is reserved for the synthetic random reference",
                RANDOM_STRATEGY
            );
        }

        if !names.insert(strategy.name.as_str()) {
            anyhow::bail!("Duplicate strategy name '{}'", strategy.name);
        }

        if strategy.batches_per_chunk == 0 {
            anyhow::bail!(
                "Strategy '{}' has batches_per_chunk 0 (must be at least 1)",
                strategy.name
            );
        }

        if strategy.use_multi_scanner {
            if loader.n_scanners == 0 {
                anyhow::bail!(
                    "Strategy '{}' uses multiple scanners but n_scanners is 0",
                    strategy.name
                );
            }
            if loader.multi_scanner_prefetch_batch_size < loader.n_scanners {
                anyhow::bail!(
                    "multi_scanner_prefetch_batch_size ({}) must be at least n_scanners ({})",
                    loader.multi_scanner_prefetch_batch_size,
                    loader.n_scanners
                );
            }
        }
    }

    if !strategies.iter().any(|s| s.name == crate::harness::SEQUENTIAL_STRATEGY) {
        tracing::warn!("no 'sequential' strategy configured; normalized scores will be skipped");
    }

    Ok(())
}
