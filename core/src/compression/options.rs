//! compression/options.rs
//! Immutable per-session compression configuration.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_COMPRESSED_BYTES_PER_KB, DEFAULT_WINDOW_BITS,
    MAX_COMPRESSED_BYTES_PER_KB, MIN_COMPRESSED_BYTES_PER_KB, RATIO_GATE_UNIT,
};
use crate::types::{CompressionError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    /// zlib window bits.
    pub window_bits: i32,
    /// `DEFAULT_COMPRESSION_LEVEL` means "whatever the backend defaults to".
    pub level: i32,
    /// zlib strategy.
    pub strategy: i32,
    /// Target dictionary size; 0 disables dictionaries.
    pub max_dict_bytes: u32,
    /// Sample bytes handed to the trainer; 0 uses raw samples as the dictionary.
    pub zstd_max_train_bytes: u32,
    /// Values <= 1 compress on the calling thread.
    pub parallel_threads: u32,
    /// Set when a caller configured these options explicitly.
    pub enabled: bool,
    /// Cap on buffered sample bytes; 0 means bounded only by the file-size target.
    pub max_dict_buffer_bytes: u64,
    /// Trainer pass (true) or direct finalize (false).
    pub use_zstd_dict_trainer: bool,
    /// Ratio gate: max stored compressed bytes per 1 KiB of input, 1..=1024.
    pub max_compressed_bytes_per_kb: i32,
    /// Ask the backend to embed a frame checksum (zstd only).
    pub checksum: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            window_bits: DEFAULT_WINDOW_BITS,
            level: DEFAULT_COMPRESSION_LEVEL,
            strategy: 0,
            max_dict_bytes: 0,
            zstd_max_train_bytes: 0,
            parallel_threads: 1,
            enabled: false,
            max_dict_buffer_bytes: 0,
            use_zstd_dict_trainer: true,
            max_compressed_bytes_per_kb: DEFAULT_MAX_COMPRESSED_BYTES_PER_KB,
            checksum: false,
        }
    }
}

/// `round(1024 / min_ratio)` clamped to `[1, 1024]`.
/// Non-positive or NaN ratios impose no constraint.
pub fn min_ratio_to_bytes_per_kb(min_ratio: f64) -> i32 {
    if !(min_ratio > 0.0) {
        return MAX_COMPRESSED_BYTES_PER_KB;
    }
    let per_kb = (RATIO_GATE_UNIT as f64 / min_ratio + 0.5).floor();
    per_kb.clamp(
        MIN_COMPRESSED_BYTES_PER_KB as f64,
        MAX_COMPRESSED_BYTES_PER_KB as f64,
    ) as i32
}

impl CompressionOptions {
    /// Set the ratio gate from a minimum acceptable uncompressed/compressed ratio.
    pub fn set_min_ratio(&mut self, min_ratio: f64) {
        self.max_compressed_bytes_per_kb = min_ratio_to_bytes_per_kb(min_ratio);
    }

    pub fn with_min_ratio(mut self, min_ratio: f64) -> Self {
        self.set_min_ratio(min_ratio);
        self
    }

    /// Use all but one core for parallel compression.
    pub fn with_auto_parallelism(mut self) -> Self {
        self.parallel_threads = num_cpus::get().saturating_sub(1).max(1) as u32;
        self
    }

    pub fn dictionary_enabled(&self) -> bool {
        self.max_dict_bytes > 0
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel_threads > 1
    }

    pub fn worker_count(&self) -> usize {
        self.parallel_threads.max(1) as usize
    }

    pub fn validate(&self) -> Result<()> {
        let range = MIN_COMPRESSED_BYTES_PER_KB..=MAX_COMPRESSED_BYTES_PER_KB;
        if !range.contains(&self.max_compressed_bytes_per_kb) {
            return Err(CompressionError::InvalidOptions(format!(
                "max_compressed_bytes_per_kb must be in 1..=1024, got {}",
                self.max_compressed_bytes_per_kb
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| CompressionError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CompressionError::InvalidOptions(e.to_string()))
    }
}
