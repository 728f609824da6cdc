//! compression/mod.rs
//! Type codes, backends, options and the per-block compression path.
//!
//! Notes:
//! - Type codes are persisted next to every block; never renumber them.
//! - The registry is filled at setup and read-only once sessions share it.
//! - Every block passes the ratio gate; a rejected block is stored under `NONE`.

pub mod block;
pub mod codecs;
pub mod constants;
pub mod gate;
pub mod options;
pub mod parse;
pub mod registry;
pub mod selection;
pub mod types;

pub use block::{
    decompress_block, decompress_block_into, BlockCompressor, BlockDecompressor, BlockOutcome,
    CompressedBlock,
};
pub use gate::RatioGate;
pub use options::{min_ratio_to_bytes_per_kb, CompressionOptions};
pub use registry::CompressionRegistry;
pub use selection::{CodecChoice, TypeSelection, TypeSelector};
pub use types::{
    BuiltinCompression, CodecCapabilities, CodecInfo, CodecParams, CompressionBackend,
    CompressionType,
};
