//! parallel/pool.rs
//! Bounded worker pool with in-order delivery.
//!
//! The submitting thread blocks while `max_outstanding` blocks are either
//! running or held waiting for an earlier block, so buffered raw blocks stay
//! bounded. Results leave the sequencer only in submission order.
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, info};

use crate::compression::block::BlockCompressor;
use crate::parallel::estimator::InflightEstimator;
use crate::parallel::sequencer::OrderedResults;
use crate::parallel::worker::{run_compression_worker, BlockJob, BlockResult};
use crate::parallel::ParallelismProfile;
use crate::types::{CompressionError, Result};

pub struct ParallelCompressor {
    job_tx: Option<Sender<BlockJob>>,
    result_rx: Receiver<BlockResult>,
    workers: Vec<JoinHandle<()>>,
    sequencer: OrderedResults<BlockResult>,
    ready: VecDeque<BlockResult>,
    inflight: usize,
    max_outstanding: usize,
}

fn workers_exited() -> CompressionError {
    CompressionError::Pipeline("compression workers exited".into())
}

impl ParallelCompressor {
    pub fn spawn(
        profile: ParallelismProfile,
        compressor: BlockCompressor,
        estimator: Arc<InflightEstimator>,
    ) -> Result<Self> {
        let workers_n = profile.worker_count.max(1);
        let (job_tx, job_rx) = bounded::<BlockJob>(workers_n);
        let (result_tx, result_rx) = unbounded::<BlockResult>();

        let mut workers = Vec::with_capacity(workers_n);
        for id in 0..workers_n {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            let compressor = compressor.clone();
            let estimator = Arc::clone(&estimator);
            let handle = thread::Builder::new()
                .name(format!("blockpress-worker-{id}"))
                .spawn(move || run_compression_worker(id, rx, tx, compressor, estimator))?;
            workers.push(handle);
        }
        info!(workers = workers_n, inflight = profile.inflight_blocks, "compression pool started");

        Ok(Self {
            job_tx: Some(job_tx),
            result_rx,
            workers,
            sequencer: OrderedResults::new(),
            ready: VecDeque::new(),
            inflight: 0,
            max_outstanding: profile.inflight_blocks.max(1),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Blocks running on a worker or held behind an earlier block.
    pub fn outstanding(&self) -> usize {
        self.inflight + self.sequencer.pending_len()
    }

    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding
    }

    /// Queue a job, waiting for completions while the pool is saturated.
    pub fn submit(&mut self, job: BlockJob) -> Result<()> {
        while self.outstanding() >= self.max_outstanding {
            self.recv_one()?;
        }
        let tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| CompressionError::Pipeline("compression pool is shut down".into()))?;
        tx.send(job).map_err(|_| workers_exited())?;
        self.inflight += 1;
        Ok(())
    }

    fn recv_one(&mut self) -> Result<()> {
        let result = self.result_rx.recv().map_err(|_| workers_exited())?;
        self.accept(result)
    }

    fn accept(&mut self, result: BlockResult) -> Result<()> {
        self.inflight -= 1;
        self.sequencer.push(result.block.index, result)?;
        self.ready.extend(self.sequencer.drain_ready());
        Ok(())
    }

    fn poll(&mut self) -> Result<()> {
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => self.accept(result)?,
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) if self.inflight == 0 => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(workers_exited()),
            }
        }
    }

    /// Results whose predecessors have all completed, in submission order.
    /// Never blocks.
    pub fn take_ready(&mut self) -> Result<Vec<BlockResult>> {
        self.poll()?;
        Ok(self.ready.drain(..).collect())
    }

    /// Wait for every submitted block and release them all in order.
    pub fn flush(&mut self) -> Result<Vec<BlockResult>> {
        while self.inflight > 0 {
            self.recv_one()?;
        }
        self.sequencer.finish()?;
        Ok(self.ready.drain(..).collect())
    }

    /// Close the queue and join the workers. Anything not yet taken is
    /// discarded, so call `flush` first on the success path.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        let Some(tx) = self.job_tx.take() else {
            return;
        };
        drop(tx);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        let mut discarded = self.sequencer.pending_len() + self.ready.len();
        while self.result_rx.try_recv().is_ok() {
            discarded += 1;
        }
        self.sequencer.clear();
        self.ready.clear();
        self.inflight = 0;
        if discarded > 0 {
            debug!(discarded, "compression pool closed with unreleased results");
        }
        info!("compression pool stopped");
    }
}

impl Drop for ParallelCompressor {
    fn drop(&mut self) {
        self.close();
    }
}
