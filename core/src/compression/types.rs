//! compression/types.rs
//! Stable type codes and the backend contract every codec satisfies.
use std::fmt;
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::compression::constants::type_codes;
use crate::compression::options::CompressionOptions;
use crate::constants::DEFAULT_COMPRESSION_LEVEL;
use crate::types::{CompressionError, Result};

/// Built-in compression methods with their fixed on-disk codes.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum BuiltinCompression {
    None   = type_codes::NONE,
    Snappy = type_codes::SNAPPY,
    Zlib   = type_codes::ZLIB,
    BZip2  = type_codes::BZIP2,
    Lz4    = type_codes::LZ4,
    Lz4Hc  = type_codes::LZ4HC,
    Xpress = type_codes::XPRESS,
    Zstd   = type_codes::ZSTD,
}

impl BuiltinCompression {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinCompression::None   => "none",
            BuiltinCompression::Snappy => "snappy",
            BuiltinCompression::Zlib   => "zlib",
            BuiltinCompression::BZip2  => "bzip2",
            BuiltinCompression::Lz4    => "lz4",
            BuiltinCompression::Lz4Hc  => "lz4hc",
            BuiltinCompression::Xpress => "xpress",
            BuiltinCompression::Zstd   => "zstd",
        }
    }
}

/// One-byte compression discriminant as persisted next to every block.
///
/// Any byte is representable so that a reader can carry unknown codes up to
/// the point where it reports them as corruption.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressionType(u8);

impl CompressionType {
    pub const NONE: Self     = Self(type_codes::NONE);
    pub const SNAPPY: Self   = Self(type_codes::SNAPPY);
    pub const ZLIB: Self     = Self(type_codes::ZLIB);
    pub const BZIP2: Self    = Self(type_codes::BZIP2);
    pub const LZ4: Self      = Self(type_codes::LZ4);
    pub const LZ4HC: Self    = Self(type_codes::LZ4HC);
    pub const XPRESS: Self   = Self(type_codes::XPRESS);
    pub const ZSTD: Self     = Self(type_codes::ZSTD);
    pub const DISABLED: Self = Self(type_codes::DISABLED);

    pub const fn from_u8(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Checked constructor for the custom range `0x80..=0xfe`.
    pub fn custom(code: u8) -> Result<Self> {
        if (type_codes::FIRST_CUSTOM..=type_codes::LAST_CUSTOM).contains(&code) {
            Ok(Self(code))
        } else {
            Err(CompressionError::CodeOutOfRange { code })
        }
    }

    pub fn builtin(self) -> Option<BuiltinCompression> {
        BuiltinCompression::try_from_primitive(self.0).ok()
    }

    pub fn is_builtin(self) -> bool {
        self.0 <= type_codes::LAST_BUILTIN
    }

    pub fn is_custom(self) -> bool {
        (type_codes::FIRST_CUSTOM..=type_codes::LAST_CUSTOM).contains(&self.0)
    }

    /// Reserved for future built-ins; neither readable nor claimable.
    pub fn is_reserved(self) -> bool {
        self.0 > type_codes::LAST_BUILTIN && self.0 < type_codes::FIRST_CUSTOM
    }

    pub fn is_disabled(self) -> bool {
        self.0 == type_codes::DISABLED
    }

    /// Codes a writer may emit next to a data block.
    pub fn is_block_code(self) -> bool {
        self.is_builtin() || self.is_custom()
    }
}

impl From<BuiltinCompression> for CompressionType {
    fn from(b: BuiltinCompression) -> Self {
        Self(b.into())
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin() {
            Some(b) => f.write_str(b.name()),
            None if self.is_custom() => write!(f, "custom(0x{:02x})", self.0),
            None if self.is_disabled() => f.write_str("disabled"),
            None => write!(f, "reserved(0x{:02x})", self.0),
        }
    }
}

bitflags! {
    /// What a backend can do beyond the mandatory contract.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CodecCapabilities: u8 {
        const DICTIONARY   = 0b0000_0001;
        const EMBEDS_SIZE  = 0b0000_0010;
        const CHECKSUM     = 0b0000_0100;
        const LEVELS       = 0b0000_1000;
    }
}

/// Static description of a backend.
#[derive(Copy, Clone, Debug)]
pub struct CodecInfo {
    pub name: &'static str,
    pub capabilities: CodecCapabilities,
    /// Level the `DEFAULT_COMPRESSION_LEVEL` sentinel maps to.
    pub default_level: Option<i32>,
}

impl CodecInfo {
    pub fn supports_dict(&self) -> bool {
        self.capabilities.contains(CodecCapabilities::DICTIONARY)
    }

    /// Map a caller level to this backend, honouring the default sentinel.
    pub fn resolve_level(&self, level: i32) -> i32 {
        match self.default_level {
            Some(default) if level == DEFAULT_COMPRESSION_LEVEL => default,
            Some(_) => level,
            None => 0,
        }
    }
}

/// Per-call parameters handed to a backend.
#[derive(Copy, Clone, Debug)]
pub struct CodecParams<'a> {
    pub level: i32,
    pub window_bits: i32,
    pub strategy: i32,
    pub checksum: bool,
    /// Finalized dictionary, if any. Empty dictionaries are passed as `None`.
    pub dict: Option<&'a [u8]>,
}

impl<'a> CodecParams<'a> {
    pub fn from_options(options: &CompressionOptions, dict: Option<&'a [u8]>) -> Self {
        Self {
            level: options.level,
            window_bits: options.window_bits,
            strategy: options.strategy,
            checksum: options.checksum,
            dict: dict.filter(|d| !d.is_empty()),
        }
    }
}

impl Default for CodecParams<'_> {
    fn default() -> Self {
        Self::from_options(&CompressionOptions::default(), None)
    }
}

/// Capability set every compression algorithm, built-in or custom, exposes.
///
/// Backends are shared across worker threads, so all methods take `&self`;
/// any per-call working state lives on the stack of the call.
pub trait CompressionBackend: Send + Sync {
    fn info(&self) -> CodecInfo;

    /// Compress an arbitrary-length input.
    fn compress(&self, raw: &[u8], params: &CodecParams<'_>) -> Result<Vec<u8>>;

    /// Compress into a caller-provided bounded buffer.
    ///
    /// Returns the number of bytes written, or `None` if the output would not
    /// fit or compression failed. A `None` means "store this block
    /// uncompressed"; the contents of `output` are then unspecified.
    fn compress_with_max_size(
        &self,
        raw: &[u8],
        params: &CodecParams<'_>,
        output: &mut [u8],
    ) -> Option<usize> {
        let compressed = self.compress(raw, params).ok()?;
        if compressed.len() > output.len() {
            return None;
        }
        output[..compressed.len()].copy_from_slice(&compressed);
        Some(compressed.len())
    }

    /// Decompress a whole block. The returned buffer is owned by the caller.
    fn decompress(&self, compressed: &[u8], dict: Option<&[u8]>) -> Result<Vec<u8>>;

    /// Size a `decompress` call would produce, when the framing carries it.
    /// `None` if the format cannot tell without decompressing, or on corrupt input.
    fn decompressed_size(&self, _compressed: &[u8]) -> Option<usize> {
        None
    }

    /// Decompress into a caller-owned buffer. An error means the buffer was
    /// too small or the input invalid; `Ok(0)` is a valid empty block.
    fn decompress_to_buffer(
        &self,
        compressed: &[u8],
        dict: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize> {
        let raw = self.decompress(compressed, dict)?;
        if raw.len() > output.len() {
            return Err(CompressionError::corruption(
                self.info().name,
                format!("output buffer too small: {} > {}", raw.len(), output.len()),
            ));
        }
        output[..raw.len()].copy_from_slice(&raw);
        Ok(raw.len())
    }
}
