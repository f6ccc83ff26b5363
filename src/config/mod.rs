//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::source::LoaderParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete benchmark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            benchmark: BenchmarkConfig::default(),
            loader: LoaderConfig::default(),
            strategies: default_strategies(),
            output: OutputConfig::default(),
        }
    }
}

/// Measurement run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of identifiers in the universe (exclusive upper bound)
    #[serde(default = "default_universe_size")]
    pub universe_size: u64,
    /// Batches collected per strategy
    #[serde(default = "default_n_batches")]
    pub n_batches: usize,
    /// Seed for the shared random source (entropy-seeded if absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            universe_size: default_universe_size(),
            n_batches: default_n_batches(),
            seed: None,
        }
    }
}

fn default_universe_size() -> u64 {
    1_000_000
}

fn default_n_batches() -> usize {
    100
}

/// Loader-wide settings shared by every strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_n_scanners")]
    pub n_scanners: usize,
    #[serde(default = "default_n_epochs")]
    pub n_epochs: usize,
    /// Rows per storage fragment (simulated loader only)
    #[serde(default = "default_fragment_size")]
    pub fragment_size: u64,
    /// Rows prefetched per chunk for single-scanner strategies
    #[serde(default = "default_prefetch_batch_size")]
    pub prefetch_batch_size: usize,
    /// Rows prefetched per chunk for multi-scanner strategies
    #[serde(default = "default_multi_scanner_prefetch")]
    pub multi_scanner_prefetch_batch_size: usize,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            n_scanners: default_n_scanners(),
            n_epochs: default_n_epochs(),
            fragment_size: default_fragment_size(),
            prefetch_batch_size: default_prefetch_batch_size(),
            multi_scanner_prefetch_batch_size: default_multi_scanner_prefetch(),
            verbose: false,
        }
    }
}

impl LoaderConfig {
    /// Parameters a source is opened with for `strategy`
    pub fn params_for(&self, strategy: &StrategyConfig) -> LoaderParams {
        LoaderParams {
            batch_size: self.batch_size,
            by_fragment: strategy.by_fragment,
            use_multi_scanner: strategy.use_multi_scanner,
            n_scanners: self.n_scanners,
            batches_per_chunk: strategy.batches_per_chunk,
            prefetch_batch_size: if strategy.use_multi_scanner {
                self.multi_scanner_prefetch_batch_size
            } else {
                self.prefetch_batch_size
            },
            n_epochs: self.n_epochs,
            raw_mode: true,
            verbose: self.verbose,
        }
    }
}

fn default_batch_size() -> usize {
    32
}

fn default_n_scanners() -> usize {
    16
}

fn default_n_epochs() -> usize {
    1000
}

fn default_fragment_size() -> u64 {
    crate::source::simulated::DEFAULT_FRAGMENT_SIZE
}

fn default_prefetch_batch_size() -> usize {
    8192
}

fn default_multi_scanner_prefetch() -> usize {
    4_194_304
}

/// One named loading strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub by_fragment: bool,
    #[serde(default)]
    pub use_multi_scanner: bool,
    #[serde(default = "default_batches_per_chunk")]
    pub batches_per_chunk: usize,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            by_fragment: false,
            use_multi_scanner: false,
            batches_per_chunk: default_batches_per_chunk(),
        }
    }
}

fn default_batches_per_chunk() -> usize {
    50
}

/// Sequential, fragment and multi-scanner strategies, lowest to highest entropy
pub fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig {
            name: "sequential".to_string(),
            description: "Sequential loading (lowest entropy)".to_string(),
            by_fragment: false,
            use_multi_scanner: false,
            batches_per_chunk: 50,
        },
        StrategyConfig {
            name: "fragment".to_string(),
            description: "Fragment-based loading (higher entropy)".to_string(),
            by_fragment: true,
            use_multi_scanner: false,
            batches_per_chunk: 50,
        },
        StrategyConfig {
            name: "mos".to_string(),
            description: "Mixture of Scanners (maximum entropy)".to_string(),
            by_fragment: false,
            use_multi_scanner: true,
            batches_per_chunk: 1,
        },
    ]
}

/// Report output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write a JSON report to this path
    #[serde(default)]
    pub json_path: Option<PathBuf>,
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (by_fragment={}, multi_scanner={}, batches_per_chunk={})",
            self.name, self.by_fragment, self.use_multi_scanner, self.batches_per_chunk
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.benchmark.universe_size, 1_000_000);
        assert_eq!(config.benchmark.n_batches, 100);
        assert_eq!(config.loader.batch_size, 32);
        let names: Vec<_> = config.strategies.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sequential", "fragment", "mos"]);
    }

    #[test]
    fn test_params_for_multi_scanner_uses_large_prefetch() {
        let loader = LoaderConfig::default();
        let strategies = default_strategies();

        let seq = loader.params_for(&strategies[0]);
        assert_eq!(seq.prefetch_batch_size, 8192);
        assert_eq!(seq.batches_per_chunk, 50);
        assert!(seq.raw_mode);

        let mos = loader.params_for(&strategies[2]);
        assert!(mos.use_multi_scanner);
        assert_eq!(mos.prefetch_batch_size, 4_194_304);
        assert_eq!(mos.batches_per_chunk, 1);
        assert_eq!(mos.n_scanners, 16);
    }

    #[test]
    fn test_strategy_display() {
        let s = StrategyConfig::new("custom");
        assert_eq!(
            s.to_string(),
            "custom (by_fragment=false, multi_scanner=false, batches_per_chunk=50)"
        );
    }
}
