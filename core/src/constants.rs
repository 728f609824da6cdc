/// Generic "use the backend's own default" level. Stored as the max 16-bit
/// int so it survives being written to an options file.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 32767;

/// Default zlib window bits (raw deflate, 16 KiB window).
pub const DEFAULT_WINDOW_BITS: i32 = -14;

/// Ratio gate default: a block must save at least 12.5 % to be stored compressed.
pub const DEFAULT_MAX_COMPRESSED_BYTES_PER_KB: i32 = 1024 * 7 / 8;

/// Bounds for `max_compressed_bytes_per_kb`.
pub const MIN_COMPRESSED_BYTES_PER_KB: i32 = 1;
pub const MAX_COMPRESSED_BYTES_PER_KB: i32 = 1024;

/// Granularity of the ratio gate.
pub const RATIO_GATE_UNIT: usize = 1024;

/// Length of the raw-size prefix written by zlib / lz4 / lz4hc backends.
pub const SIZE_PREFIX_LEN: usize = 4;

/// Largest block a size-prefixed backend can describe.
pub const MAX_BLOCK_SIZE: usize = u32::MAX as usize;

/// Upper bound on outstanding blocks per worker before submission blocks.
pub const INFLIGHT_BLOCKS_PER_WORKER: usize = 2;
