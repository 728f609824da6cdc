// ## 📂 parallel/
// Multi-threaded block compression that keeps output in submission order.

pub mod estimator;
pub mod pool;
pub mod sequencer;
pub mod worker;

pub use estimator::InflightEstimator;
pub use pool::ParallelCompressor;
pub use sequencer::OrderedResults;
pub use worker::{compress_job, BlockJob, BlockResult};

use crate::compression::options::CompressionOptions;
use crate::constants::INFLIGHT_BLOCKS_PER_WORKER;

/// Worker count and the cap on blocks in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismProfile {
    pub worker_count: usize,
    pub inflight_blocks: usize,
}

impl ParallelismProfile {
    pub fn from_options(options: &CompressionOptions) -> Self {
        let worker_count = options.worker_count();
        Self { worker_count, inflight_blocks: worker_count * INFLIGHT_BLOCKS_PER_WORKER }
    }
}
