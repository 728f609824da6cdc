//! blockpress-core
//!
//! Block-level compression for immutable sorted files: pluggable backends
//! behind stable one-byte type codes, a ratio gate, shared dictionaries
//! and in-order parallel compression.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod compression;
pub mod dictionary;
pub mod parallel;
pub mod session;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::{
        decompress_block, BlockDecompressor, BlockOutcome, CompressedBlock, CompressionBackend,
        CompressionOptions, CompressionRegistry, CompressionType, TypeSelection,
    };
    pub use crate::dictionary::{
        CacheMemoryAccountant, Dictionary, MemoryAccountant, SamplingPolicy, UnlimitedAccountant,
    };
    pub use crate::session::{CompressionSession, SessionConfig, SessionSummary};
    pub use crate::types::{CompressionError, Result};
}
