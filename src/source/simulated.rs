//! Simulated dataloader
//!
//! An in-process loader over a synthetic universe of `universe_size` rows. It reproduces
//! the access patterns of the three classic loading strategies so the harness can be
//! driven without a real dataset:
//!
//! - **Sequential**: contiguous chunks of `batch_size * batches_per_chunk` rows, read in
//!   order and shuffled within the chunk
//! - **Fragment**: the universe is split into fragments of `fragment_size` rows; whole
//!   fragments are read in a random order per epoch and shuffled within the fragment
//! - **Multi-scanner**: every chunk pools `prefetch_batch_size / n_scanners` contiguous
//!   rows from each of `n_scanners` random start positions and shuffles the pool
//!
//! The loader stops after `n_epochs * universe_size` rows. Only raw mode is supported:
//! records carry identifiers and nothing else.
//!
//! # Example
//!
//! ```
//! use loadentropy::source::{LoaderParams, SourceFactory};
//! use loadentropy::source::simulated::SimulatedDataset;
//!
//! let dataset = SimulatedDataset::new(10_000).with_seed(7);
//! let params = LoaderParams { n_epochs: 1, ..LoaderParams::default() };
//!
//! let total: usize = dataset
//!     .open(&params)
//!     .unwrap()
//!     .map(|batch| batch.unwrap().len())
//!     .sum();
//! assert_eq!(total, 10_000);
//! ```

use super::{BatchRecord, BatchStream, LoaderParams, SourceFactory};
use crate::{Identifier, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::VecDeque;

/// Default number of rows per storage fragment
pub const DEFAULT_FRAGMENT_SIZE: u64 = 65_536;

/// Handle to a synthetic dataset; opens [`SimulatedLoader`]s
#[derive(Debug, Clone)]
pub struct SimulatedDataset {
    universe_size: u64,
    fragment_size: u64,
    seed: Option<u64>,
}

impl SimulatedDataset {
    pub fn new(universe_size: u64) -> Self {
        Self {
            universe_size,
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            seed: None,
        }
    }

    pub fn with_fragment_size(mut self, fragment_size: u64) -> Self {
        self.fragment_size = fragment_size;
        self
    }

    /// Seed every loader opened from this dataset
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl SourceFactory for SimulatedDataset {
    fn open(&self, params: &LoaderParams) -> Result<BatchStream> {
        if !params.raw_mode {
            anyhow::bail!("simulated loader only supports raw mode");
        }
        if params.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }
        if params.by_fragment && self.fragment_size == 0 {
            anyhow::bail!("fragment_size must be greater than 0 for fragment loading");
        }
        if params.use_multi_scanner && params.n_scanners == 0 {
            anyhow::bail!("n_scanners must be greater than 0 for multi-scanner loading");
        }

        let rng = match self.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        Ok(Box::new(SimulatedLoader::new(
            params.clone(),
            self.universe_size,
            self.fragment_size,
            rng,
        )))
    }
}

/// Row access pattern of a loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Sequential,
    Fragment,
    MultiScanner,
}

impl ScanMode {
    /// Multi-scanner takes precedence over fragment grouping
    pub fn from_params(params: &LoaderParams) -> Self {
        if params.use_multi_scanner {
            ScanMode::MultiScanner
        } else if params.by_fragment {
            ScanMode::Fragment
        } else {
            ScanMode::Sequential
        }
    }
}

/// Batch iterator over a synthetic universe
pub struct SimulatedLoader {
    params: LoaderParams,
    mode: ScanMode,
    universe_size: u64,
    fragment_size: u64,
    rng: Xoshiro256PlusPlus,

    /// Rows still to be produced before exhaustion
    rows_remaining: u64,
    /// Shuffled rows waiting to be cut into batches
    pending: VecDeque<Identifier>,

    /// Next row for sequential scanning
    cursor: u64,
    /// Fragment visit order for the current epoch
    fragment_order: Vec<u64>,
}

impl SimulatedLoader {
    pub fn new(
        params: LoaderParams,
        universe_size: u64,
        fragment_size: u64,
        rng: Xoshiro256PlusPlus,
    ) -> Self {
        let mode = ScanMode::from_params(&params);
        let rows_remaining = universe_size.saturating_mul(params.n_epochs as u64);
        if params.verbose {
            tracing::debug!(
                ?mode,
                universe_size,
                rows_remaining,
                "opened simulated loader"
            );
        }

        Self {
            params,
            mode,
            universe_size,
            fragment_size,
            rng,
            rows_remaining,
            pending: VecDeque::new(),
            cursor: 0,
            fragment_order: Vec::new(),
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Read the next chunk into `pending`
    fn fill_chunk(&mut self) {
        let mut chunk = match self.mode {
            ScanMode::Sequential => self.read_sequential(),
            ScanMode::Fragment => self.read_fragment(),
            ScanMode::MultiScanner => self.read_scanners(),
        };

        chunk.truncate(usize::try_from(self.rows_remaining).unwrap_or(usize::MAX));
        self.rows_remaining -= chunk.len() as u64;
        chunk.shuffle(&mut self.rng);
        self.pending.extend(chunk);
    }

    fn read_sequential(&mut self) -> Vec<Identifier> {
        let chunk_rows = (self.params.batch_size * self.params.batches_per_chunk.max(1)) as u64;
        if self.cursor >= self.universe_size {
            self.cursor = 0;
        }
        let end = (self.cursor + chunk_rows).min(self.universe_size);
        let rows = (self.cursor..end).collect();
        self.cursor = end;
        rows
    }

    fn read_fragment(&mut self) -> Vec<Identifier> {
        if self.fragment_order.is_empty() {
            let n_fragments = self.universe_size.div_ceil(self.fragment_size);
            self.fragment_order = (0..n_fragments).collect();
            self.fragment_order.shuffle(&mut self.rng);
        }

        match self.fragment_order.pop() {
            Some(fragment) => {
                let start = fragment * self.fragment_size;
                let end = (start + self.fragment_size).min(self.universe_size);
                (start..end).collect()
            }
            None => Vec::new(),
        }
    }

    fn read_scanners(&mut self) -> Vec<Identifier> {
        let n_scanners = self.params.n_scanners.max(1);
        let per_scanner = ((self.params.prefetch_batch_size / n_scanners).max(1) as u64)
            .min(self.universe_size);
        if per_scanner == 0 {
            return Vec::new();
        }

        let mut rows = Vec::with_capacity(per_scanner as usize * n_scanners);
        for _ in 0..n_scanners {
            let start = self.rng.gen_range(0..=self.universe_size - per_scanner);
            rows.extend(start..start + per_scanner);
        }
        rows
    }
}

impl Iterator for SimulatedLoader {
    type Item = Result<BatchRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.len() < self.params.batch_size && self.rows_remaining > 0 {
            let before = self.rows_remaining;
            self.fill_chunk();
            if self.rows_remaining == before {
                // Empty universe: nothing left to read
                self.rows_remaining = 0;
            }
        }

        if self.pending.is_empty() {
            return None;
        }

        let take = self.params.batch_size.min(self.pending.len());
        let cell_ids = self.pending.drain(..take).collect();
        Some(Ok(BatchRecord::new(cell_ids)))
    }
}
