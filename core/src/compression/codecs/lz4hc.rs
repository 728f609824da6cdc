//! codecs/lz4hc.rs
//! LZ4 high-compression backend (liblz4 HC via the `lz4` crate).
//!
//! Output is a plain LZ4 block with the same `[raw_len: u32 LE]` prefix as
//! the `lz4` backend, so decoding shares its path.
use lz4::block::{compress_to_buffer, compress_bound, CompressionMode};

use crate::compression::codecs::lz4::{decode_block, split};
use crate::compression::constants::DEFAULT_LEVEL_LZ4HC;
use crate::compression::types::{CodecCapabilities, CodecInfo, CodecParams, CompressionBackend};
use crate::constants::SIZE_PREFIX_LEN;
use crate::types::{CompressionError, Result};
use crate::utils::{read_size_prefix, write_size_prefix};

const LZ4HC_MIN_LEVEL: i32 = 1;
const LZ4HC_MAX_LEVEL: i32 = 12;

pub struct Lz4HcBackend;

impl Lz4HcBackend {
    fn mode(&self, params: &CodecParams<'_>) -> CompressionMode {
        let level = self
            .info()
            .resolve_level(params.level)
            .clamp(LZ4HC_MIN_LEVEL, LZ4HC_MAX_LEVEL);
        CompressionMode::HIGHCOMPRESSION(level)
    }
}

impl CompressionBackend for Lz4HcBackend {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "lz4hc",
            capabilities: CodecCapabilities::EMBEDS_SIZE | CodecCapabilities::LEVELS,
            default_level: Some(DEFAULT_LEVEL_LZ4HC),
        }
    }

    fn compress(&self, raw: &[u8], params: &CodecParams<'_>) -> Result<Vec<u8>> {
        let bound = compress_bound(raw.len()).map_err(|e| CompressionError::codec("lz4hc", e))?;
        let mut out = vec![0u8; SIZE_PREFIX_LEN + bound];
        let n = self
            .compress_with_max_size(raw, params, &mut out)
            .ok_or_else(|| CompressionError::codec("lz4hc", "compression failed"))?;
        out.truncate(n);
        Ok(out)
    }

    fn compress_with_max_size(
        &self,
        raw: &[u8],
        params: &CodecParams<'_>,
        output: &mut [u8],
    ) -> Option<usize> {
        write_size_prefix(raw.len(), output)?;
        if raw.is_empty() {
            return Some(SIZE_PREFIX_LEN);
        }
        let body = &mut output[SIZE_PREFIX_LEN..];
        if body.is_empty() {
            return None;
        }
        let n = compress_to_buffer(raw, Some(self.mode(params)), false, body).ok()?;
        Some(SIZE_PREFIX_LEN + n)
    }

    fn decompress(&self, compressed: &[u8], _dict: Option<&[u8]>) -> Result<Vec<u8>> {
        let (raw_len, body) = split("lz4hc", compressed)?;
        let mut raw = vec![0u8; raw_len];
        if raw_len > 0 || !body.is_empty() {
            decode_block("lz4hc", body, None, &mut raw)?;
        }
        Ok(raw)
    }

    fn decompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        read_size_prefix(compressed).map(|(raw_len, _)| raw_len)
    }

    fn decompress_to_buffer(
        &self,
        compressed: &[u8],
        _dict: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize> {
        let (raw_len, body) = split("lz4hc", compressed)?;
        if raw_len == 0 && body.is_empty() {
            return Ok(0);
        }
        let out = output.get_mut(..raw_len).ok_or_else(|| {
            CompressionError::corruption("lz4hc", format!("output buffer too small: {raw_len}"))
        })?;
        decode_block("lz4hc", body, None, out)
    }
}
