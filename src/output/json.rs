//! JSON output formatting
//!
//! Serializes one benchmark run: run parameters, raw per-strategy records, normalized
//! scores (when both anchors were measured) and the estimator's fixed baselines.

use crate::config::Config;
use crate::estimator::Baselines;
use crate::harness::EntropyMetrics;
use crate::report::{normalize_results, NormalizedScore};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

/// Raw statistics for one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonStrategyResult {
    pub strategy: String,
    pub within_batch_l1: f64,
    pub across_batch_l1: f64,
    pub n_batches: usize,
    pub total_ids: usize,
    pub measurement_secs: f64,
}

impl From<&EntropyMetrics> for JsonStrategyResult {
    fn from(m: &EntropyMetrics) -> Self {
        Self {
            strategy: m.strategy.clone(),
            within_batch_l1: m.within_batch_l1,
            across_batch_l1: m.across_batch_l1,
            n_batches: m.n_batches,
            total_ids: m.total_ids,
            measurement_secs: m.measurement_time.as_secs_f64(),
        }
    }
}

/// Parameters the run was made with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunInfo {
    pub universe_size: u64,
    pub n_batches: usize,
    pub batch_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub strategies: Vec<String>,
}

/// Complete report file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub timestamp: String,
    pub run: JsonRunInfo,
    pub baselines: Baselines,
    pub results: Vec<JsonStrategyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<Vec<NormalizedScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization_error: Option<String>,
}

/// Build the report for one run
pub fn build_json_report(
    config: &Config,
    baselines: &Baselines,
    results: &[EntropyMetrics],
) -> JsonReport {
    let (normalized, normalization_error) = match normalize_results(results) {
        Ok(scores) => (Some(scores), None),
        Err(e) => (None, Some(e.to_string())),
    };

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        run: JsonRunInfo {
            universe_size: config.benchmark.universe_size,
            n_batches: config.benchmark.n_batches,
            batch_size: config.loader.batch_size,
            seed: config.benchmark.seed,
            strategies: config.strategies.iter().map(|s| s.name.clone()).collect(),
        },
        baselines: *baselines,
        results: results.iter().map(JsonStrategyResult::from).collect(),
        normalized,
        normalization_error,
    }
}

/// Write a report to `output_path`, creating parent directories as needed
pub fn write_json_report(output_path: &Path, report: &JsonReport, pretty: bool) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON report: {}", output_path.display()))?;

    if pretty {
        serde_json::to_writer_pretty(file, report)?;
    } else {
        serde_json::to_writer(file, report)?;
    }

    tracing::info!("Saved JSON report to {}", output_path.display());
    Ok(())
}
