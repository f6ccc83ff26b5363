//! Distance estimation
//!
//! This module turns batches of identifiers into scale-comparable randomness
//! statistics, independent of which loading strategy produced them.
//!
//! # Statistics
//!
//! - **Within-batch**: mean sampled `|a - b|` over identifier pairs from the same batch
//! - **Across-batch**: mean sampled `|a - b|` between identifiers of consecutive batches
//!
//! Larger values mean identifiers are more dispersed. Both are estimated from at most
//! 100 sampled pairs per batch (or per adjacent batch pair).
//!
//! # Baselines
//!
//! Each estimator computes fixed sequential and uniform-random reference values once,
//! at construction, and uses them in [`DistanceEstimator::normalize_within`] and
//! [`DistanceEstimator::normalize_across`].
//!
//! # Example
//!
//! ```
//! use loadentropy::estimator::DistanceEstimator;
//!
//! let mut estimator = DistanceEstimator::with_seed(1_000_000, 42);
//!
//! let sequential: Vec<Vec<u64>> = (0..10u64)
//!     .map(|i| (i * 32..(i + 1) * 32).collect())
//!     .collect();
//! let within = estimator.within_batch(&sequential);
//! let across = estimator.across_batch(&sequential);
//!
//! assert!(within > 0.0 && within < 32.0);
//! assert!(across > 0.0 && across < 64.0);
//! assert!(estimator.normalize_within(within) < 0.1);
//! ```

pub mod pairwise;

use crate::{Batch, Identifier};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Batch size used for the fixed baselines
pub const BASELINE_BATCH_SIZE: usize = 32;

/// Number of consecutive batches used for the across-batch baselines
pub const BASELINE_ACROSS_BATCHES: usize = 10;

/// Anchor spread below which normalization gives up and returns 0.5
const DEGENERATE_SPREAD: f64 = 1e-10;

/// Rescale `value` so that `sequential` maps to 0 and `random` maps to 1
///
/// The result is intentionally not clamped: a strategy more dispersed than the
/// random anchor scores above 1, one more clustered than the sequential anchor
/// scores below 0. When the anchors are closer than `1e-10` the score is exactly 0.5.
///
/// # Example
///
/// ```
/// use loadentropy::normalize_score;
///
/// assert_eq!(normalize_score(10.0, 10.0, 20.0), 0.0);
/// assert_eq!(normalize_score(20.0, 10.0, 20.0), 1.0);
/// assert_eq!(normalize_score(30.0, 10.0, 20.0), 2.0);
/// assert_eq!(normalize_score(99.0, 5.0, 5.0), 0.5);
/// ```
pub fn normalize_score(value: f64, sequential: f64, random: f64) -> f64 {
    if (random - sequential).abs() < DEGENERATE_SPREAD {
        return 0.5;
    }
    (value - sequential) / (random - sequential)
}

/// Fixed reference statistics computed once per estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baselines {
    /// Within-batch statistic of one contiguous batch `[0, 32)`
    pub sequential_within: f64,
    /// Within-batch statistic of one uniformly drawn batch of 32
    pub random_within: f64,
    /// Across-batch statistic of 10 contiguous batches `[32i, 32i + 32)`
    pub sequential_across: f64,
    /// Across-batch statistic of 10 independently drawn uniform batches
    pub random_across: f64,
}

impl Baselines {
    /// Compute the baselines for a universe of `max_id` identifiers
    ///
    /// Random draws take `min(32, max_id)` unique identifiers per batch. Draws for
    /// different batches are independent, so identifiers may repeat between batches.
    pub fn compute<R: Rng + ?Sized>(max_id: u64, rng: &mut R) -> Self {
        let size = BASELINE_BATCH_SIZE as u64;

        let sequential_batch: Batch = (0..size).collect();
        let sequential_within = pairwise::mean_pairwise_l1(rng, &sequential_batch);

        let random_batch = draw_unique(rng, max_id, BASELINE_BATCH_SIZE);
        let random_within = pairwise::mean_pairwise_l1(rng, &random_batch);

        let sequential_batches: Vec<Batch> = (0..BASELINE_ACROSS_BATCHES as u64)
            .map(|i| (i * size..(i + 1) * size).collect())
            .collect();
        let sequential_across = pairwise::across_batch(rng, &sequential_batches);

        let random_batches: Vec<Batch> = (0..BASELINE_ACROSS_BATCHES)
            .map(|_| draw_unique(rng, max_id, BASELINE_BATCH_SIZE))
            .collect();
        let random_across = pairwise::across_batch(rng, &random_batches);

        Self {
            sequential_within,
            random_within,
            sequential_across,
            random_across,
        }
    }
}

/// Draw up to `count` distinct identifiers uniformly from `[0, max_id)`
///
/// Returns `min(count, max_id)` identifiers in draw order.
pub fn draw_unique<R: Rng + ?Sized>(rng: &mut R, max_id: u64, count: usize) -> Batch {
    let universe = usize::try_from(max_id).unwrap_or(usize::MAX);
    let amount = count.min(universe);
    index::sample(rng, universe, amount)
        .iter()
        .map(|i| i as Identifier)
        .collect()
}

/// Estimates within-batch and across-batch identifier spread
///
/// The estimator owns the random source used for all of its sampling. The harness
/// borrows the same source through [`DistanceEstimator::rng_mut`] so one generator
/// drives every random decision of a run.
///
/// # Thread Safety
///
/// Not shared between threads; a run is single-threaded and sequential.
pub struct DistanceEstimator<R: Rng = Xoshiro256PlusPlus> {
    max_id: u64,
    baselines: Baselines,
    rng: R,
}

impl DistanceEstimator<Xoshiro256PlusPlus> {
    /// Create an estimator with an entropy-seeded generator
    pub fn new(max_id: u64) -> Self {
        Self::with_rng(max_id, Xoshiro256PlusPlus::from_entropy())
    }

    /// Create an estimator with a specific seed
    ///
    /// Useful for reproducible runs and tests.
    pub fn with_seed(max_id: u64, seed: u64) -> Self {
        Self::with_rng(max_id, Xoshiro256PlusPlus::seed_from_u64(seed))
    }
}

impl<R: Rng> DistanceEstimator<R> {
    /// Create an estimator driven by the given generator
    ///
    /// Baselines are computed immediately from `rng`.
    pub fn with_rng(max_id: u64, mut rng: R) -> Self {
        let baselines = Baselines::compute(max_id, &mut rng);
        Self {
            max_id,
            baselines,
            rng,
        }
    }

    /// Exclusive upper bound of the identifier universe
    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    /// Fixed baselines computed at construction
    pub fn baselines(&self) -> &Baselines {
        &self.baselines
    }

    /// Shared random source
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Within-batch statistic of a batch set
    ///
    /// Mean of the per-batch sampled statistics; batches with fewer than 2
    /// identifiers are skipped. Returns 0.0 if no batch qualifies.
    pub fn within_batch<B: AsRef<[Identifier]>>(&mut self, batches: &[B]) -> f64 {
        pairwise::within_batch(&mut self.rng, batches)
    }

    /// Within-batch statistic of a single batch
    pub fn within_batch_single(&mut self, batch: &[Identifier]) -> f64 {
        pairwise::mean_pairwise_l1(&mut self.rng, batch)
    }

    /// Across-batch statistic of an ordered batch set
    ///
    /// Only consecutive batches are compared. Returns 0.0 for fewer than 2 batches.
    pub fn across_batch<B: AsRef<[Identifier]>>(&mut self, batches: &[B]) -> f64 {
        pairwise::across_batch(&mut self.rng, batches)
    }

    /// Draw up to `count` distinct identifiers uniformly from the universe
    pub fn draw_unique(&mut self, count: usize) -> Batch {
        draw_unique(&mut self.rng, self.max_id, count)
    }

    /// Normalize a within-batch value against the fixed baselines
    pub fn normalize_within(&self, value: f64) -> f64 {
        normalize_score(
            value,
            self.baselines.sequential_within,
            self.baselines.random_within,
        )
    }

    /// Normalize an across-batch value against the fixed baselines
    pub fn normalize_across(&self, value: f64) -> f64 {
        normalize_score(
            value,
            self.baselines.sequential_across,
            self.baselines.random_across,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn contiguous_batches(n: u64, size: u64) -> Vec<Batch> {
        (0..n).map(|i| (i * size..(i + 1) * size).collect()).collect()
    }

    #[test]
    fn test_within_batch_small_batches_are_zero() {
        let mut est = DistanceEstimator::with_seed(1000, 1);
        let empty: Vec<Batch> = vec![];
        assert_eq!(est.within_batch(&empty), 0.0);
        assert_eq!(est.within_batch(&[vec![7u64]]), 0.0);
        assert_eq!(est.within_batch(&[vec![], vec![3u64]]), 0.0);
        assert_eq!(est.within_batch_single(&[5]), 0.0);
    }

    #[test]
    fn test_across_batch_single_batch_is_zero() {
        let mut est = DistanceEstimator::with_seed(1000, 2);
        let empty: Vec<Batch> = vec![];
        assert_eq!(est.across_batch(&empty), 0.0);
        assert_eq!(est.across_batch(&[(0..32u64).collect::<Batch>()]), 0.0);
    }

    #[test]
    fn test_within_batch_shift_invariant() {
        let batch: Batch = vec![3, 90, 17, 400, 256, 1, 999, 42, 77, 500, 12, 610];
        let shifted: Batch = batch.iter().map(|id| id + 123_456).collect();

        // Same seed, same sampled pairs: absolute differences are identical
        let mut a = DistanceEstimator::with_seed(1_000_000, 11);
        let mut b = DistanceEstimator::with_seed(1_000_000, 11);
        let va = a.within_batch(&[batch]);
        let vb = b.within_batch(&[shifted]);
        assert!((va - vb).abs() < 1e-12, "{} vs {}", va, vb);
    }

    #[test]
    fn test_contiguous_beats_uniform_within_batch() {
        let mut est = DistanceEstimator::with_seed(1000, 2024);
        let sequential: Batch = (0..32).collect();

        let mut wins = 0;
        for _ in 0..20 {
            let random = est.draw_unique(32);
            let seq = est.within_batch(&[sequential.clone()]);
            let rnd = est.within_batch(&[random]);
            if seq < rnd {
                wins += 1;
            }
        }
        assert!(wins >= 19, "sequential beat random only {} of 20 times", wins);
    }

    #[test]
    fn test_consecutive_batches_across_is_about_one_batch_width() {
        let mut est = DistanceEstimator::with_seed(1_000_000, 5);
        let batches = contiguous_batches(10, 32);
        let across = est.across_batch(&batches);
        // Mean of |a - b| for a in [0,32), b in [32,64) is exactly 32
        assert!((across - 32.0).abs() < 3.0, "across = {}", across);
    }

    #[test]
    fn test_baselines_ordering() {
        let est = DistanceEstimator::with_seed(1_000_000, 99);
        let b = est.baselines();
        assert!(b.sequential_within > 0.0 && b.sequential_within < 32.0);
        assert!(b.random_within > b.sequential_within);
        assert!(b.random_across > b.sequential_across);
        assert!((b.sequential_across - 32.0).abs() < 3.0);
    }

    #[test]
    fn test_fixed_baseline_normalization_anchors() {
        let est = DistanceEstimator::with_seed(50_000, 3);
        let b = *est.baselines();
        assert!(est.normalize_within(b.sequential_within).abs() < 1e-9);
        assert!((est.normalize_within(b.random_within) - 1.0).abs() < 1e-9);
        assert!(est.normalize_across(b.sequential_across).abs() < 1e-9);
        assert!((est.normalize_across(b.random_across) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_score_anchors() {
        let (s, r) = (10.5, 333.25);
        assert!(normalize_score(s, s, r).abs() < 1e-12);
        assert!((normalize_score(r, s, r) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_score_degenerate_spread() {
        assert_eq!(normalize_score(0.0, 7.0, 7.0), 0.5);
        assert_eq!(normalize_score(1e9, 7.0, 7.0 + 1e-11), 0.5);
        assert_eq!(normalize_score(-3.0, 7.0, 7.0 - 1e-11), 0.5);
    }

    #[test]
    fn test_normalize_score_not_clamped() {
        assert!(normalize_score(500.0, 10.0, 100.0) > 1.0);
        assert!(normalize_score(1.0, 10.0, 100.0) < 0.0);
    }

    #[test]
    fn test_draw_unique() {
        let mut est = DistanceEstimator::with_seed(100, 8);
        let ids = est.draw_unique(50);
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|&id| id < 100));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 50);

        // Capped at the universe size
        assert_eq!(est.draw_unique(500).len(), 100);
    }

    #[test]
    fn test_tiny_universe_baselines() {
        let est = DistanceEstimator::with_seed(5, 1);
        let b = est.baselines();
        assert!(b.random_within >= 0.0);
        assert!(b.random_across >= 0.0);

        let est = DistanceEstimator::with_seed(0, 1);
        assert_eq!(est.baselines().random_within, 0.0);
        assert_eq!(est.baselines().random_across, 0.0);
    }

    #[test]
    fn test_seeded_estimators_agree() {
        let a = DistanceEstimator::with_seed(10_000, 77);
        let b = DistanceEstimator::with_seed(10_000, 77);
        assert_eq!(a.baselines(), b.baselines());
    }
}
