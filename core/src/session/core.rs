//! session/core.rs
//! Per-file compression session.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::compression::block::{BlockCompressor, BlockDecompressor, CompressedBlock};
use crate::compression::options::CompressionOptions;
use crate::compression::registry::CompressionRegistry;
use crate::compression::selection::TypeSelector;
use crate::dictionary::{
    Dictionary, DictionarySampler, MemoryAccountant, SampleOutcome, SamplerState,
};
use crate::parallel::{
    compress_job, BlockJob, BlockResult, InflightEstimator, ParallelCompressor, ParallelismProfile,
};
use crate::session::types::{SessionConfig, SessionState, SessionSummary};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{CompressionError, Result};

/// Compression state for one file being built.
///
/// Blocks go in through `compress_block` and come back, in the same order,
/// from `take_ready` or `finish`. While a dictionary is being sampled,
/// blocks are held and compressed once the dictionary is final, so every
/// block of the file sees the same dictionary.
pub struct CompressionSession {
    registry: Arc<CompressionRegistry>,
    options: Arc<CompressionOptions>,
    selector: TypeSelector,
    compressor: BlockCompressor,
    sampler: Option<DictionarySampler>,
    dictionary: Option<Dictionary>,
    held: VecDeque<(u64, Bytes)>,
    held_bytes: u64,
    pool: Option<ParallelCompressor>,
    ready: VecDeque<CompressedBlock>,
    estimator: Arc<InflightEstimator>,
    next_index: u64,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
    state: SessionState,
}

impl CompressionSession {
    /// Validate the configuration, resolve every selected type and start
    /// the worker pool if one is configured. All configuration errors
    /// surface here.
    pub fn configure(
        registry: Arc<CompressionRegistry>,
        accountant: Arc<dyn MemoryAccountant>,
        config: SessionConfig,
    ) -> Result<Self> {
        config.options.validate()?;
        let selector = TypeSelector::resolve(&config.selection, &registry)?;
        let options = Arc::new(config.options);
        let compressor = BlockCompressor::new(Arc::clone(&options));
        let estimator = Arc::new(InflightEstimator::new());

        let sampler = if options.dictionary_enabled() && selector.any_supports_dict() {
            Some(DictionarySampler::new(
                Arc::clone(&options),
                config.sampling,
                config.file_size_target,
                accountant,
            ))
        } else {
            if options.dictionary_enabled() {
                debug!("no selected backend takes a dictionary, sampling skipped");
            }
            None
        };

        let pool = if options.is_parallel() {
            Some(ParallelCompressor::spawn(
                ParallelismProfile::from_options(&options),
                compressor.clone(),
                Arc::clone(&estimator),
            )?)
        } else {
            None
        };

        debug!(
            selection = ?config.selection,
            dictionary = sampler.is_some(),
            workers = options.worker_count(),
            "compression session configured"
        );

        Ok(Self {
            registry,
            options,
            selector,
            compressor,
            sampler,
            dictionary: None,
            held: VecDeque::new(),
            held_bytes: 0,
            pool,
            ready: VecDeque::new(),
            estimator,
            next_index: 0,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
            state: SessionState::Open,
        })
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub fn sampler_state(&self) -> Option<SamplerState> {
        self.sampler.as_ref().map(DictionarySampler::state)
    }

    /// The finalized dictionary, once there is one.
    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    /// Blocks submitted so far.
    pub fn submitted(&self) -> u64 {
        self.next_index
    }

    /// Reader for blocks produced by this session.
    pub fn decompressor(&self) -> BlockDecompressor {
        BlockDecompressor::new(Arc::clone(&self.registry))
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            SessionState::Open => Ok(()),
            other => Err(CompressionError::Pipeline(format!("session is {other:?}"))),
        }
    }

    /// Push the next block; returns its index. Block failures are never
    /// reported here, only pool breakdowns.
    pub fn compress_block(&mut self, raw: impl Into<Bytes>) -> Result<u64> {
        self.ensure_open()?;
        let raw = raw.into();
        let index = self.next_index;
        self.next_index += 1;
        self.counters.add_submitted(raw.len());

        let sampler = match self.sampler.as_mut() {
            Some(s) if s.is_collecting() => s,
            _ => {
                self.dispatch(index, raw)?;
                return Ok(index);
            }
        };

        let start = Instant::now();
        let outcome = sampler.offer(&raw);
        self.timer.add_stage_time(Stage::Sample, start.elapsed());
        match outcome {
            SampleOutcome::Buffered(n) | SampleOutcome::Full(n) => self.counters.add_sampled(n),
            SampleOutcome::Denied => self.counters.add_denial(),
            SampleOutcome::Ignored => {}
        }
        let collecting = sampler.is_collecting();

        self.held_bytes += raw.len() as u64;
        self.held.push_back((index, raw));

        if !collecting {
            self.finalize_dictionary()?;
        }
        Ok(index)
    }

    fn dispatch(&mut self, index: u64, raw: Bytes) -> Result<()> {
        let choice = self.selector.next();
        let dictionary = self.dictionary.clone().filter(|d| !d.is_empty());
        let estimate = self.estimator.on_dispatch(raw.len());
        let job = BlockJob { index, raw, choice, dictionary, estimate };

        match self.pool.as_mut() {
            Some(pool) => pool.submit(job),
            None => {
                let result = compress_job(job, &self.compressor, &self.estimator);
                self.timer.add_stage_time(Stage::Compress, result.elapsed);
                self.ready.push_back(result.block);
                Ok(())
            }
        }
    }

    /// Stop sampling and build the dictionary now; held blocks are then
    /// compressed with it. Safe to call more than once. Without dictionary
    /// support this returns the empty dictionary.
    pub fn finalize_dictionary(&mut self) -> Result<Dictionary> {
        self.ensure_open()?;
        if let Some(dict) = &self.dictionary {
            return Ok(dict.clone());
        }
        let Some(sampler) = self.sampler.as_mut() else {
            return Ok(Dictionary::empty());
        };

        let buffered = sampler.buffered_bytes();
        let dict = self.timer.time(Stage::Train, || sampler.finalize());
        self.counters.set_dictionary(dict.len());
        info!(
            origin = ?dict.origin(),
            dict_bytes = dict.len(),
            sample_bytes = buffered,
            held_blocks = self.held.len(),
            "dictionary finalized"
        );
        self.dictionary = Some(dict.clone());

        while let Some((index, raw)) = self.held.pop_front() {
            self.held_bytes -= raw.len() as u64;
            self.dispatch(index, raw)?;
        }
        Ok(dict)
    }

    /// Completed blocks whose predecessors are all complete, in order.
    pub fn take_ready(&mut self) -> Result<Vec<CompressedBlock>> {
        let mut out: Vec<CompressedBlock> = self.ready.drain(..).collect();
        if let Some(pool) = self.pool.as_mut() {
            let results = pool.take_ready()?;
            out.extend(self.record_results(results));
        }
        for block in &out {
            self.counters.add_block(block);
        }
        Ok(out)
    }

    fn record_results(&mut self, results: Vec<BlockResult>) -> Vec<CompressedBlock> {
        results
            .into_iter()
            .map(|r| {
                self.timer.add_stage_time(Stage::Compress, r.elapsed);
                r.block
            })
            .collect()
    }

    /// Output size so far: completed blocks at their stored size, in-flight
    /// blocks at their estimate, held blocks at their raw size.
    pub fn estimated_output_bytes(&self) -> u64 {
        self.estimator.estimated_output_bytes() + self.held_bytes
    }

    pub fn estimated_inflight_bytes(&self) -> u64 {
        self.estimator.inflight_bytes()
    }

    /// Flush everything and close the session.
    pub fn finish(mut self) -> Result<SessionSummary> {
        self.ensure_open()?;
        let dictionary = if self.sampler.is_some() {
            self.finalize_dictionary()?
        } else {
            Dictionary::empty()
        };

        let mut blocks = self.take_ready()?;
        if let Some(mut pool) = self.pool.take() {
            let results = pool.flush()?;
            pool.shutdown();
            let flushed = self.record_results(results);
            for block in &flushed {
                self.counters.add_block(block);
            }
            blocks.extend(flushed);
        }

        self.state = SessionState::Finished;
        self.timer.finish();
        let telemetry = TelemetrySnapshot::from(&self.counters, &self.timer);
        info!(
            blocks = self.counters.blocks_submitted,
            raw = self.counters.bytes_raw,
            stored = self.counters.bytes_stored,
            "compression session finished"
        );
        Ok(SessionSummary { blocks, dictionary, telemetry })
    }

    /// Discard every result. Running jobs are allowed to finish; the
    /// dictionary charge is returned.
    pub fn abort(mut self) {
        self.abort_inner();
    }

    fn abort_inner(&mut self) {
        if self.state != SessionState::Open {
            return;
        }
        self.state = SessionState::Aborted;
        if let Some(pool) = self.pool.take() {
            drop(pool);
        }
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.abandon();
        }
        let discarded = self.held.len() + self.ready.len();
        self.held.clear();
        self.held_bytes = 0;
        self.ready.clear();
        warn!(submitted = self.next_index, discarded, "compression session aborted");
    }
}

impl Drop for CompressionSession {
    fn drop(&mut self) {
        self.abort_inner();
    }
}
