//! Sampled pairwise L1 statistics
//!
//! Low-level sampling routines shared by the estimator and its baselines. All
//! functions take the random source explicitly so callers decide who owns it.
//!
//! Exact enumeration of all pairs is never needed: the statistic only has to be
//! accurate to a few percent, so at most [`MAX_SAMPLED_PAIRS`] pairs are drawn.

use crate::Identifier;
use rand::seq::index;
use rand::Rng;

/// Upper bound on the number of pairs sampled per batch (or per batch pair)
pub const MAX_SAMPLED_PAIRS: usize = 100;

/// Number of unordered pairs in a batch of `n` identifiers
#[inline]
pub fn available_pairs(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    n.checked_mul(n - 1).map(|p| p / 2).unwrap_or(usize::MAX)
}

/// Map a rank in `[0, n*(n-1)/2)` to the unordered pair `(i, j)`, `i < j`
///
/// Ranks follow lexicographic combination order: `(0,1), (0,2), ..., (0,n-1), (1,2), ...`.
/// Row `i` holds `n - 1 - i` pairs.
fn pair_at(n: usize, mut rank: usize) -> (usize, usize) {
    let mut i = 0;
    loop {
        let row = n - 1 - i;
        if rank < row {
            return (i, i + 1 + rank);
        }
        rank -= row;
        i += 1;
    }
}

/// Mean absolute difference over sampled identifier pairs of one batch
///
/// Draws `min(100, available_pairs)` distinct unordered pairs uniformly at random.
/// Returns 0.0 for batches with fewer than 2 identifiers.
pub fn mean_pairwise_l1<R: Rng + ?Sized>(rng: &mut R, ids: &[Identifier]) -> f64 {
    if ids.len() < 2 {
        return 0.0;
    }

    let available = available_pairs(ids.len());
    if available == 0 {
        return 0.0;
    }

    let n_pairs = available.min(MAX_SAMPLED_PAIRS);
    let total: f64 = index::sample(rng, available, n_pairs)
        .iter()
        .map(|rank| {
            let (i, j) = pair_at(ids.len(), rank);
            ids[i].abs_diff(ids[j]) as f64
        })
        .sum();

    total / n_pairs as f64
}

/// Absolute differences between positionally paired samples of two batches
///
/// Samples `k = min(len(a), len(b), 100)` indices without replacement from each
/// batch independently and zips them. Returns an empty vector when either batch
/// is empty.
pub fn adjacent_distances<R: Rng + ?Sized>(
    rng: &mut R,
    a: &[Identifier],
    b: &[Identifier],
) -> Vec<u64> {
    let k = a.len().min(b.len()).min(MAX_SAMPLED_PAIRS);
    if k == 0 {
        return Vec::new();
    }

    let left = index::sample(rng, a.len(), k);
    let right = index::sample(rng, b.len(), k);

    left.iter()
        .zip(right.iter())
        .map(|(i, j)| a[i].abs_diff(b[j]))
        .collect()
}

/// Mean of per-batch pairwise statistics, skipping batches with < 2 identifiers
pub fn within_batch<R, B>(rng: &mut R, batches: &[B]) -> f64
where
    R: Rng + ?Sized,
    B: AsRef<[Identifier]>,
{
    let mut sum = 0.0;
    let mut count = 0usize;

    for batch in batches {
        let ids = batch.as_ref();
        if ids.len() < 2 {
            continue;
        }
        sum += mean_pairwise_l1(rng, ids);
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean sampled distance between identifiers of consecutive batches
///
/// Only adjacent pairs `(batches[i], batches[i + 1])` contribute. A pair yielding no
/// samples is skipped; if nothing is collected at all the result is 0.0.
pub fn across_batch<R, B>(rng: &mut R, batches: &[B]) -> f64
where
    R: Rng + ?Sized,
    B: AsRef<[Identifier]>,
{
    if batches.len() < 2 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut count = 0usize;

    for pair in batches.windows(2) {
        for d in adjacent_distances(rng, pair[0].as_ref(), pair[1].as_ref()) {
            sum += d as f64;
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
