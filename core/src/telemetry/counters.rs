//! telemetry/counters.rs
//! Mutable counters collected while a session runs.
//!
//! Converted into an immutable `TelemetrySnapshot` when the session finishes.
use std::ops::AddAssign;
use serde::{Deserialize, Serialize};

use crate::compression::block::{BlockOutcome, CompressedBlock};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub blocks_submitted: u64,
    pub blocks_compressed: u64,
    /// Stored verbatim because the compressed form missed the gate. On the
    /// bounded path this also covers a backend error, which that path
    /// cannot tell apart from a miss.
    pub blocks_rejected: u64,
    /// Stored verbatim because the backend broke its contract, or failed
    /// on the unbounded path.
    pub blocks_failed: u64,
    /// Stored verbatim because no compression was selected.
    pub blocks_uncompressed: u64,
    pub bytes_raw: u64,
    pub bytes_stored: u64,
    pub bytes_sampled: u64,
    pub bytes_dictionary: u64,
    pub charge_denials: u64,
}

impl TelemetryCounters {
    pub fn add_submitted(&mut self, raw_len: usize) {
        self.blocks_submitted += 1;
        self.bytes_raw += raw_len as u64;
    }

    /// Record one block leaving the session.
    pub fn add_block(&mut self, block: &CompressedBlock) {
        match block.outcome {
            BlockOutcome::Compressed => self.blocks_compressed += 1,
            BlockOutcome::RatioRejected => self.blocks_rejected += 1,
            BlockOutcome::BackendFailed | BlockOutcome::ContractViolation => self.blocks_failed += 1,
            BlockOutcome::NotRequested => self.blocks_uncompressed += 1,
        }
        self.bytes_stored += block.stored_len() as u64;
    }

    pub fn add_sampled(&mut self, bytes: usize) {
        self.bytes_sampled += bytes as u64;
    }

    pub fn add_denial(&mut self) {
        self.charge_denials += 1;
    }

    pub fn set_dictionary(&mut self, bytes: usize) {
        self.bytes_dictionary = bytes as u64;
    }

    /// Blocks that came back out, whatever their outcome.
    pub fn blocks_emitted(&self) -> u64 {
        self.blocks_compressed + self.blocks_rejected + self.blocks_failed + self.blocks_uncompressed
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        *self += other.clone();
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.blocks_submitted    += rhs.blocks_submitted;
        self.blocks_compressed   += rhs.blocks_compressed;
        self.blocks_rejected     += rhs.blocks_rejected;
        self.blocks_failed       += rhs.blocks_failed;
        self.blocks_uncompressed += rhs.blocks_uncompressed;
        self.bytes_raw           += rhs.bytes_raw;
        self.bytes_stored        += rhs.bytes_stored;
        self.bytes_sampled       += rhs.bytes_sampled;
        self.bytes_dictionary    += rhs.bytes_dictionary;
        self.charge_denials      += rhs.charge_denials;
    }
}
