//! Strategy benchmark harness
//!
//! Drives the distance estimator over several named loading strategies and a synthetic
//! uniform-random reference, producing one [`EntropyMetrics`] record per strategy.
//!
//! # Measurement
//!
//! For each strategy the harness:
//!
//! 1. Opens a batch source with the strategy's loader parameters
//! 2. Pulls batches until `n_batches` are collected or the source is exhausted (timed)
//! 3. Computes the within-batch statistic on up to 100 randomly sub-sampled batches
//! 4. Computes the across-batch statistic on the full, ordered batch set
//!
//! A strategy whose source fails is logged and skipped; the remaining strategies still
//! run. The `random` record is appended last and never goes through a source.
//!
//! Execution is single-threaded: each strategy runs to completion before the next.
//!
//! # Example
//!
//! ```
//! use loadentropy::harness::EntropyBenchmark;
//! use loadentropy::source::simulated::SimulatedDataset;
//!
//! let dataset = SimulatedDataset::new(100_000).with_seed(1);
//! let mut bench = EntropyBenchmark::with_seed(dataset, 100_000, 1);
//!
//! let results = bench.benchmark_all_strategies(20);
//! let names: Vec<_> = results.iter().map(|r| r.strategy.as_str()).collect();
//! assert_eq!(names, vec!["sequential", "fragment", "mos", "random"]);
//! ```

use crate::config::{default_strategies, Config, LoaderConfig, StrategyConfig};
use crate::estimator::{DistanceEstimator, BASELINE_BATCH_SIZE};
use crate::source::SourceFactory;
use crate::{Batch, Result};
use anyhow::Context;
use rand::seq::index;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Name of the synthetic uniform-random reference record
pub const RANDOM_STRATEGY: &str = "random";

/// Name of the strategy used as the measured lower anchor
pub const SEQUENTIAL_STRATEGY: &str = "sequential";

/// Upper bound on batches sub-sampled for the within-batch statistic
pub const MAX_WITHIN_SAMPLE_BATCHES: usize = 100;

/// Batch size of the synthetic random reference
pub const REFERENCE_BATCH_SIZE: usize = BASELINE_BATCH_SIZE;

/// Log collection progress every this many batches
const PROGRESS_INTERVAL: usize = 1000;

/// Entropy measurement results for one strategy
///
/// Built once per strategy per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyMetrics {
    pub strategy: String,
    /// Mean sampled L1 distance between identifiers of the same batch
    pub within_batch_l1: f64,
    /// Mean sampled L1 distance between identifiers of consecutive batches
    pub across_batch_l1: f64,
    /// Batches collected
    pub n_batches: usize,
    /// Identifiers collected across all batches
    pub total_ids: usize,
    /// Wall-clock time of the collection loop (zero for the random reference)
    pub measurement_time: Duration,
}

/// Benchmarks the entropy of several loading strategies
///
/// Owns the source factory and the distance estimator. The estimator's random source
/// is the only one used: pair sampling, batch sub-sampling and the random reference
/// all draw from it.
pub struct EntropyBenchmark<F, R: Rng = Xoshiro256PlusPlus> {
    factory: F,
    estimator: DistanceEstimator<R>,
    loader: LoaderConfig,
    strategies: Vec<StrategyConfig>,
}

impl<F: SourceFactory> EntropyBenchmark<F> {
    /// Create a harness with an entropy-seeded estimator and the default strategies
    pub fn new(factory: F, max_id: u64) -> Self {
        Self::with_estimator(factory, DistanceEstimator::new(max_id))
    }

    /// Create a harness with a seeded estimator and the default strategies
    pub fn with_seed(factory: F, max_id: u64, seed: u64) -> Self {
        Self::with_estimator(factory, DistanceEstimator::with_seed(max_id, seed))
    }

    /// Create a harness from a validated configuration
    pub fn from_config(factory: F, config: &Config) -> Self {
        let max_id = config.benchmark.universe_size;
        let estimator = match config.benchmark.seed {
            Some(seed) => DistanceEstimator::with_seed(max_id, seed),
            None => DistanceEstimator::new(max_id),
        };

        Self::with_estimator(factory, estimator)
            .with_loader(config.loader.clone())
            .with_strategies(config.strategies.clone())
    }
}

impl<F: SourceFactory, R: Rng> EntropyBenchmark<F, R> {
    /// Create a harness around an existing estimator
    pub fn with_estimator(factory: F, estimator: DistanceEstimator<R>) -> Self {
        Self {
            factory,
            estimator,
            loader: LoaderConfig::default(),
            strategies: default_strategies(),
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<StrategyConfig>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    pub fn strategies(&self) -> &[StrategyConfig] {
        &self.strategies
    }

    pub fn estimator(&self) -> &DistanceEstimator<R> {
        &self.estimator
    }

    /// Measure one strategy
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or fails while batches are
    /// being collected.
    pub fn run_entropy_measurement(
        &mut self,
        strategy: &StrategyConfig,
        n_batches: usize,
    ) -> Result<EntropyMetrics> {
        tracing::info!(strategy = %strategy.name, n_batches, "measuring entropy");

        let params = self.loader.params_for(strategy);
        let source = self
            .factory
            .open(&params)
            .with_context(|| format!("Failed to open batch source for '{}'", strategy.name))?;

        let mut batches: Vec<Batch> = Vec::with_capacity(n_batches.min(1 << 16));
        let mut total_ids = 0usize;
        let start = Instant::now();

        for record in source.take(n_batches) {
            let record = record.with_context(|| {
                format!(
                    "Batch source for '{}' failed after {} batches",
                    strategy.name,
                    batches.len()
                )
            })?;
            total_ids += record.len();
            batches.push(record.cell_ids);

            if batches.len() % PROGRESS_INTERVAL == 0 {
                tracing::debug!(
                    strategy = %strategy.name,
                    collected = batches.len(),
                    "collecting batches"
                );
            }
        }

        let measurement_time = start.elapsed();
        tracing::info!(
            strategy = %strategy.name,
            batches = batches.len(),
            total_ids,
            secs = measurement_time.as_secs_f64(),
            "collection complete"
        );

        Ok(self.summarize(&strategy.name, &batches, total_ids, measurement_time))
    }

    /// Measure every configured strategy, then append the random reference
    ///
    /// Strategies that fail are logged and omitted. The returned list keeps the
    /// configured order with `random` last.
    pub fn benchmark_all_strategies(&mut self, n_batches: usize) -> Vec<EntropyMetrics> {
        let strategies = self.strategies.clone();
        tracing::info!(
            strategies = strategies.len(),
            n_batches,
            "testing entropy strategies"
        );

        let mut results = Vec::with_capacity(strategies.len() + 1);
        for strategy in &strategies {
            match self.run_entropy_measurement(strategy, n_batches) {
                Ok(metrics) => results.push(metrics),
                Err(e) => {
                    tracing::warn!(strategy = %strategy.name, "measurement failed: {:#}", e);
                }
            }
        }

        results.push(self.random_reference(n_batches));
        results
    }

    /// Synthesize the uniform-random reference record
    ///
    /// Draws `n_batches * 32` unique identifiers in one go (capped at the universe
    /// size), cuts them into batches of 32 in draw order and summarizes them like a
    /// measured strategy. The duration is zero.
    pub fn random_reference(&mut self, n_batches: usize) -> EntropyMetrics {
        let requested = n_batches.saturating_mul(REFERENCE_BATCH_SIZE);
        let ids = self.estimator.draw_unique(requested);
        if ids.len() < requested {
            tracing::warn!(
                requested,
                drawn = ids.len(),
                "universe too small for the random reference; using every identifier"
            );
        }

        let batches: Vec<Batch> = ids
            .chunks(REFERENCE_BATCH_SIZE)
            .map(<[u64]>::to_vec)
            .collect();
        tracing::info!(
            batches = batches.len(),
            total_ids = ids.len(),
            "generated random reference"
        );

        self.summarize(RANDOM_STRATEGY, &batches, ids.len(), Duration::ZERO)
    }

    /// Within-batch on a batch sub-sample, across-batch on the full ordered set
    fn summarize(
        &mut self,
        strategy: &str,
        batches: &[Batch],
        total_ids: usize,
        measurement_time: Duration,
    ) -> EntropyMetrics {
        let rng = self.estimator.rng_mut();
        let sample: Vec<&Batch> = within_sample_indices(rng, batches.len())
            .into_iter()
            .map(|i| &batches[i])
            .collect();

        let within_batch_l1 = self.estimator.within_batch(&sample);
        let across_batch_l1 = self.estimator.across_batch(batches);

        EntropyMetrics {
            strategy: strategy.to_string(),
            within_batch_l1,
            across_batch_l1,
            n_batches: batches.len(),
            total_ids,
            measurement_time,
        }
    }
}

/// Distinct batch positions used for the within-batch statistic
///
/// Every position when there are at most [`MAX_WITHIN_SAMPLE_BATCHES`] batches, otherwise
/// a uniform sample of that many without replacement.
fn within_sample_indices<R: Rng + ?Sized>(rng: &mut R, n_batches: usize) -> Vec<usize> {
    let sample_size = n_batches.min(MAX_WITHIN_SAMPLE_BATCHES);
    index::sample(rng, n_batches, sample_size).into_vec()
}
