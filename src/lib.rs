//! loadentropy - Dataloader iteration-order entropy measurement
//!
//! loadentropy quantifies how "random" the order is in which a data-loading strategy
//! yields element identifiers. It samples pairwise L1 distances between identifiers
//! within a batch and across consecutive batches, then rescales the result against
//! sequential and uniform-random references so that 0 reads as "fully sequential" and
//! 1 as "fully random".
//!
//! # Architecture
//!
//! - **Distance estimator**: sampled within-batch and across-batch spread statistics
//! - **Batch sources**: trait seam to external dataloaders, plus a simulated loader
//! - **Benchmark harness**: per-strategy collection, synthetic random reference
//! - **Report**: normalization against the measured sequential/random anchors
//! - **Output**: text tables and JSON reports

pub mod config;
pub mod estimator;
pub mod harness;
pub mod output;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use estimator::{normalize_score, DistanceEstimator};
pub use harness::{EntropyBenchmark, EntropyMetrics};

/// Result type used throughout loadentropy
pub type Result<T> = anyhow::Result<T>;

/// Non-negative integer naming one data element in a fixed universe `[0, max_id)`
pub type Identifier = u64;

/// Ordered identifiers yielded by one pull from a batch source
pub type Batch = Vec<Identifier>;
