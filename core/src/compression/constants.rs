/// Stable one-byte compression type codes. These are part of the on-disk
/// format: never renumber an existing entry.
pub mod type_codes {
    pub const NONE: u8    = 0x00;
    pub const SNAPPY: u8  = 0x01;
    pub const ZLIB: u8    = 0x02;
    pub const BZIP2: u8   = 0x03;
    pub const LZ4: u8     = 0x04;
    pub const LZ4HC: u8   = 0x05;
    pub const XPRESS: u8  = 0x06;
    pub const ZSTD: u8    = 0x07;
    pub const LAST_BUILTIN: u8 = ZSTD;

    // 0x08..=0x7f reserved for future built-ins.

    pub const FIRST_CUSTOM: u8 = 0x80;
    pub const LAST_CUSTOM: u8  = 0xfe;

    /// "Compression turned off for this context". Never written per block.
    pub const DISABLED: u8 = 0xff;
}

/// Levels the `DEFAULT_COMPRESSION_LEVEL` sentinel maps to.
pub const DEFAULT_LEVEL_ZLIB: i32 = 6;
pub const DEFAULT_LEVEL_LZ4HC: i32 = 9;
pub const DEFAULT_LEVEL_ZSTD: i32 = 3;
