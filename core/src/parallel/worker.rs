//! parallel/worker.rs
//! Worker loop: compress jobs off the shared queue until it closes.
use std::sync::Arc;
use std::time::{Duration, Instant};
use bytes::Bytes;
use crossbeam::channel::{Receiver, Sender};
use tracing::trace;

use crate::compression::block::{BlockCompressor, CompressedBlock};
use crate::compression::selection::CodecChoice;
use crate::dictionary::Dictionary;
use crate::parallel::estimator::InflightEstimator;

/// One block handed to a worker. The codec is chosen on the submitting
/// thread so selection stays deterministic.
pub struct BlockJob {
    pub index: u64,
    pub raw: Bytes,
    pub choice: CodecChoice,
    pub dictionary: Option<Dictionary>,
    /// Value returned by `InflightEstimator::on_dispatch`.
    pub estimate: u64,
}

pub struct BlockResult {
    pub block: CompressedBlock,
    pub elapsed: Duration,
}

/// Compress one job and settle its estimate.
pub fn compress_job(
    job: BlockJob,
    compressor: &BlockCompressor,
    estimator: &InflightEstimator,
) -> BlockResult {
    let start = Instant::now();
    let raw_len = job.raw.len();
    let block = compressor.compress(job.index, job.raw, &job.choice, job.dictionary.as_ref());
    estimator.on_complete(raw_len, job.estimate, block.stored_len());
    BlockResult { block, elapsed: start.elapsed() }
}

pub fn run_compression_worker(
    id: usize,
    rx: Receiver<BlockJob>,
    tx: Sender<BlockResult>,
    compressor: BlockCompressor,
    estimator: Arc<InflightEstimator>,
) {
    while let Ok(job) = rx.recv() {
        let index = job.index;
        let result = compress_job(job, &compressor, &estimator);
        trace!(worker = id, index, "block done");
        if tx.send(result).is_err() {
            // Receiver gone: the session was aborted.
            break;
        }
    }
}
