//! parallel/estimator.rs
//! Output-size estimate covering blocks whose compressed size is not known yet.
//!
//! Each dispatched block is charged `raw_len * ratio`, where `ratio` is the
//! cumulative stored/raw ratio of completed blocks (1.0 before any complete).
//! On completion the estimate is replaced by the actual stored size.
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct InflightEstimator {
    inflight_bytes: AtomicU64,
    inflight_blocks: AtomicU64,
    completed_raw: AtomicU64,
    completed_stored: AtomicU64,
}

impl InflightEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Historical stored/raw ratio.
    pub fn ratio(&self) -> f64 {
        let raw = self.completed_raw.load(Ordering::Acquire);
        let stored = self.completed_stored.load(Ordering::Acquire);
        if raw == 0 {
            1.0
        } else {
            stored as f64 / raw as f64
        }
    }

    pub fn estimate(&self, raw_len: usize) -> u64 {
        (raw_len as f64 * self.ratio()).ceil() as u64
    }

    /// Register a block as in flight; returns the estimate to hand back
    /// to `on_complete`.
    pub fn on_dispatch(&self, raw_len: usize) -> u64 {
        let estimate = self.estimate(raw_len);
        self.inflight_bytes.fetch_add(estimate, Ordering::AcqRel);
        self.inflight_blocks.fetch_add(1, Ordering::AcqRel);
        estimate
    }

    pub fn on_complete(&self, raw_len: usize, estimate: u64, stored_len: usize) {
        self.completed_raw.fetch_add(raw_len as u64, Ordering::AcqRel);
        self.completed_stored.fetch_add(stored_len as u64, Ordering::AcqRel);
        let _ = self
            .inflight_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| Some(cur.saturating_sub(estimate)));
        let _ = self
            .inflight_blocks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| Some(cur.saturating_sub(1)));
    }

    /// Drop an in-flight estimate without recording a completion.
    pub fn on_discard(&self, estimate: u64) {
        let _ = self
            .inflight_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| Some(cur.saturating_sub(estimate)));
        let _ = self
            .inflight_blocks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| Some(cur.saturating_sub(1)));
    }

    pub fn inflight_bytes(&self) -> u64 {
        self.inflight_bytes.load(Ordering::Acquire)
    }

    pub fn inflight_blocks(&self) -> u64 {
        self.inflight_blocks.load(Ordering::Acquire)
    }

    pub fn completed_stored_bytes(&self) -> u64 {
        self.completed_stored.load(Ordering::Acquire)
    }

    /// Completed actual sizes plus in-flight estimates.
    pub fn estimated_output_bytes(&self) -> u64 {
        self.completed_stored_bytes() + self.inflight_bytes()
    }
}
