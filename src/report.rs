//! Normalized entropy scores
//!
//! Rescales every measured strategy against the anchors measured in the same run: the
//! `sequential` strategy's record is the lower anchor (0) and the synthetic `random`
//! record the upper anchor (1). The estimator's fixed baselines are deliberately not
//! consulted here; they back [`DistanceEstimator::normalize_within`] and
//! [`DistanceEstimator::normalize_across`] instead.
//!
//! [`DistanceEstimator::normalize_within`]: crate::estimator::DistanceEstimator::normalize_within
//! [`DistanceEstimator::normalize_across`]: crate::estimator::DistanceEstimator::normalize_across

use crate::estimator::normalize_score;
use crate::harness::{EntropyMetrics, RANDOM_STRATEGY, SEQUENTIAL_STRATEGY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why normalized scores could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("no 'random' baseline record found")]
    MissingRandomBaseline,
    #[error("no 'sequential' strategy record found to anchor the scores")]
    MissingSequentialAnchor,
}

/// One strategy's statistics on the `[0 = sequential, 1 = random]` scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScore {
    pub strategy: String,
    pub within_batch: f64,
    pub across_batch: f64,
}

/// Normalize every non-random record against the measured anchors
///
/// The `random` record is left out of the output. Scores are not clamped.
pub fn normalize_results(
    results: &[EntropyMetrics],
) -> Result<Vec<NormalizedScore>, ReportError> {
    let random = results
        .iter()
        .find(|r| r.strategy == RANDOM_STRATEGY)
        .ok_or(ReportError::MissingRandomBaseline)?;
    let sequential = results
        .iter()
        .find(|r| r.strategy == SEQUENTIAL_STRATEGY)
        .ok_or(ReportError::MissingSequentialAnchor)?;

    Ok(results
        .iter()
        .filter(|r| r.strategy != RANDOM_STRATEGY)
        .map(|r| NormalizedScore {
            strategy: r.strategy.clone(),
            within_batch: normalize_score(
                r.within_batch_l1,
                sequential.within_batch_l1,
                random.within_batch_l1,
            ),
            across_batch: normalize_score(
                r.across_batch_l1,
                sequential.across_batch_l1,
                random.across_batch_l1,
            ),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(strategy: &str, within: f64, across: f64) -> EntropyMetrics {
        EntropyMetrics {
            strategy: strategy.to_string(),
            within_batch_l1: within,
            across_batch_l1: across,
            n_batches: 10,
            total_ids: 320,
            measurement_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_anchors_map_to_zero_and_one() {
        let results = vec![
            record("sequential", 11.0, 32.0),
            record("fragment", 5_000.0, 40_000.0),
            record("random", 333_000.0, 333_000.0),
        ];
        let scores = normalize_results(&results).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].strategy, "sequential");
        assert!(scores[0].within_batch.abs() < 1e-12);
        assert!(scores[0].across_batch.abs() < 1e-12);
        assert!(scores[1].within_batch > 0.0 && scores[1].within_batch < 1.0);
    }

    #[test]
    fn test_strategy_matching_random_scores_one() {
        let results = vec![
            record("sequential", 11.0, 32.0),
            record("mos", 320_000.0, 310_000.0),
            record("random", 320_000.0, 330_000.0),
        ];
        let scores = normalize_results(&results).unwrap();
        let mos = scores.iter().find(|s| s.strategy == "mos").unwrap();
        assert!((mos.within_batch - 1.0).abs() < 1e-9);
        assert!(mos.across_batch < 1.0);
    }

    #[test]
    fn test_random_excluded_and_not_clamped() {
        let results = vec![
            record("sequential", 100.0, 100.0),
            record("scattered", 900.0, 50.0),
            record("random", 500.0, 500.0),
        ];
        let scores = normalize_results(&results).unwrap();
        assert!(scores.iter().all(|s| s.strategy != "random"));
        assert_eq!(scores[1].within_batch, 2.0);
        assert!(scores[1].across_batch < 0.0);
    }

    #[test]
    fn test_missing_random() {
        let results = vec![record("sequential", 11.0, 32.0)];
        assert_eq!(
            normalize_results(&results).unwrap_err(),
            ReportError::MissingRandomBaseline
        );
    }

    #[test]
    fn test_missing_sequential() {
        let results = vec![record("mos", 1.0, 2.0), record("random", 3.0, 4.0)];
        assert_eq!(
            normalize_results(&results).unwrap_err(),
            ReportError::MissingSequentialAnchor
        );
    }

    #[test]
    fn test_degenerate_anchor_gives_half() {
        let results = vec![
            record("sequential", 7.0, 7.0),
            record("other", 123.0, 0.0),
            record("random", 7.0, 7.0),
        ];
        let scores = normalize_results(&results).unwrap();
        assert!(scores.iter().all(|s| s.within_batch == 0.5 && s.across_batch == 0.5));
    }
}
