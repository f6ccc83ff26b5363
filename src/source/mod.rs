//! Batch source abstraction
//!
//! A batch source is the dataloader under test. The harness never looks inside it:
//! it opens one source per strategy through a [`SourceFactory`], pulls batch records
//! until it has enough or the source is exhausted, and reads the identifiers from
//! each record's `cell_ids` field.
//!
//! Any prefetching, chunking or scanner interleaving is internal to the source.
//!
//! # Example
//!
//! ```
//! use loadentropy::source::{BatchRecord, BatchStream, LoaderParams, SourceFactory};
//!
//! // Closures with the right shape are factories
//! let factory = |params: &LoaderParams| -> loadentropy::Result<BatchStream> {
//!     let size = params.batch_size as u64;
//!     let batches = (0..4u64).map(move |i| -> loadentropy::Result<BatchRecord> {
//!         Ok(BatchRecord::new((i * size..(i + 1) * size).collect()))
//!     });
//!     Ok(Box::new(batches))
//! };
//!
//! let mut stream = factory.open(&LoaderParams::default()).unwrap();
//! let first = stream.next().unwrap().unwrap();
//! assert_eq!(first.cell_ids.len(), 32);
//! ```

pub mod simulated;

use crate::{Batch, Result};
use serde::{Deserialize, Serialize};

/// One batch pulled from a source
///
/// Sources running in raw mode only fill in the identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Identifiers of the elements in this batch, in yield order
    pub cell_ids: Batch,
}

impl BatchRecord {
    pub fn new(cell_ids: Batch) -> Self {
        Self { cell_ids }
    }

    pub fn len(&self) -> usize {
        self.cell_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_ids.is_empty()
    }
}

/// Parameters a source is opened with
///
/// Combines the loader-wide settings with one strategy's switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderParams {
    /// Identifiers per batch
    pub batch_size: usize,
    /// Group reads by storage fragment
    pub by_fragment: bool,
    /// Interleave several scanners at random positions
    pub use_multi_scanner: bool,
    /// Number of scanners in multi-scanner mode
    pub n_scanners: usize,
    /// Batches read per chunk before shuffling
    pub batches_per_chunk: usize,
    /// Rows prefetched per chunk
    pub prefetch_batch_size: usize,
    /// Passes over the universe before the source is exhausted
    pub n_epochs: usize,
    /// Yield identifiers only
    pub raw_mode: bool,
    /// Let the source log its own progress
    pub verbose: bool,
}

impl Default for LoaderParams {
    fn default() -> Self {
        Self {
            batch_size: 32,
            by_fragment: false,
            use_multi_scanner: false,
            n_scanners: 16,
            batches_per_chunk: 50,
            prefetch_batch_size: 8192,
            n_epochs: 1000,
            raw_mode: true,
            verbose: false,
        }
    }
}

/// Lazy, finite stream of batch records
///
/// `None` means the source is exhausted; `Some(Err(_))` means it failed.
pub type BatchStream = Box<dyn Iterator<Item = Result<BatchRecord>>>;

/// Opens batch sources for a strategy
///
/// The factory owns the dataset handle, so the universe the identifiers come from
/// is implicit in the factory.
pub trait SourceFactory {
    /// Open a fresh source configured with `params`
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be constructed (missing dataset,
    /// unsupported parameter combination).
    fn open(&self, params: &LoaderParams) -> Result<BatchStream>;
}

impl<F> SourceFactory for F
where
    F: Fn(&LoaderParams) -> Result<BatchStream>,
{
    fn open(&self, params: &LoaderParams) -> Result<BatchStream> {
        self(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_record_accessors() {
        let record = BatchRecord::new(vec![1, 2, 3]);
        assert_eq!(record.len(), 3);
        assert!(!record.is_empty());
        assert!(BatchRecord::new(vec![]).is_empty());
    }

    #[test]
    fn test_closure_factory_receives_params() {
        let factory = |params: &LoaderParams| -> Result<BatchStream> {
            let size = params.batch_size as u64;
            let record: Result<BatchRecord> = Ok(BatchRecord::new((0..size).collect()));
            Ok(Box::new(std::iter::once(record)))
        };

        let params = LoaderParams {
            batch_size: 8,
            ..LoaderParams::default()
        };
        let batches: Vec<_> = factory.open(&params).unwrap().collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].as_ref().unwrap().len(), 8);
    }

    #[test]
    fn test_closure_factory_error() {
        let factory = |_: &LoaderParams| -> Result<BatchStream> {
            anyhow::bail!("dataset not found")
        };
        let err = factory.open(&LoaderParams::default()).err().unwrap();
        assert!(err.to_string().contains("dataset not found"));
    }
}
