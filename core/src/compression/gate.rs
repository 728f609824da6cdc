//! compression/gate.rs
//! Per-block accept/reject decision on compressed size.
use crate::compression::options::CompressionOptions;
use crate::constants::RATIO_GATE_UNIT;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RatioGate {
    max_compressed_bytes_per_kb: usize,
}

impl RatioGate {
    /// `per_kb` must already be validated into `1..=1024`.
    pub fn new(per_kb: i32) -> Self {
        Self { max_compressed_bytes_per_kb: per_kb.max(0) as usize }
    }

    pub fn from_options(options: &CompressionOptions) -> Self {
        Self::new(options.max_compressed_bytes_per_kb)
    }

    /// `ceil(raw_len / 1024) * max_compressed_bytes_per_kb`.
    pub fn allowed(&self, raw_len: usize) -> usize {
        raw_len
            .div_ceil(RATIO_GATE_UNIT)
            .saturating_mul(self.max_compressed_bytes_per_kb)
    }

    /// Largest compressed size that still passes; `None` if nothing can.
    pub fn max_accepted(&self, raw_len: usize) -> Option<usize> {
        self.allowed(raw_len).checked_sub(1)
    }

    /// Compressed form is kept only when strictly below the allowance.
    pub fn accepts(&self, raw_len: usize, compressed_len: usize) -> bool {
        compressed_len < self.allowed(raw_len)
    }
}
