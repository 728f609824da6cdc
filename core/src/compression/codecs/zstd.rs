//! codecs/zstd.rs
//! Zstandard backend on the bulk (single-frame) API.
//!
//! Frames always carry their content size, so `decompressed_size` never has
//! to decode. Dictionaries may be trained or raw-content; zstd accepts both.
use std::io;
use zstd::bulk::{Compressor, Decompressor};
use zstd::stream::raw::CParameter;

use crate::compression::constants::DEFAULT_LEVEL_ZSTD;
use crate::compression::types::{CodecCapabilities, CodecInfo, CodecParams, CompressionBackend};
use crate::constants::MAX_BLOCK_SIZE;
use crate::types::{CompressionError, Result};

pub struct ZstdBackend;

/// Best case is an RLE block: 4 bytes of frame data per 128 KiB of content.
const MAX_ZSTD_RATIO: usize = (128 * 1024) / 4;

impl ZstdBackend {
    fn compressor(&self, params: &CodecParams<'_>) -> io::Result<Compressor<'static>> {
        let level = self.info().resolve_level(params.level);
        let mut compressor = match params.dict {
            Some(d) => Compressor::with_dictionary(level, d)?,
            None => Compressor::new(level)?,
        };
        if params.checksum {
            compressor.set_parameter(CParameter::ChecksumFlag(true))?;
        }
        Ok(compressor)
    }

    fn decompressor(&self, dict: Option<&[u8]>) -> Result<Decompressor<'static>> {
        match dict.filter(|d| !d.is_empty()) {
            Some(d) => Decompressor::with_dictionary(d),
            None => Decompressor::new(),
        }
        .map_err(|e| CompressionError::corruption("zstd", e.to_string()))
    }

    fn content_size(&self, compressed: &[u8]) -> Result<usize> {
        match zstd_safe::get_frame_content_size(compressed) {
            Ok(Some(n)) if n > MAX_BLOCK_SIZE as u64 => Err(CompressionError::corruption(
                "zstd",
                format!("frame content size {n} exceeds block limit"),
            )),
            Ok(Some(n)) if n as usize > compressed.len().saturating_mul(MAX_ZSTD_RATIO) => {
                Err(CompressionError::corruption(
                    "zstd",
                    format!("frame content size {n} impossible for {} byte frame", compressed.len()),
                ))
            }
            Ok(Some(n)) => Ok(n as usize),
            Ok(None) => Err(CompressionError::corruption("zstd", "frame has no content size")),
            Err(_) => Err(CompressionError::corruption("zstd", "invalid frame header")),
        }
    }
}

impl CompressionBackend for ZstdBackend {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "zstd",
            capabilities: CodecCapabilities::EMBEDS_SIZE
                | CodecCapabilities::DICTIONARY
                | CodecCapabilities::CHECKSUM
                | CodecCapabilities::LEVELS,
            default_level: Some(DEFAULT_LEVEL_ZSTD),
        }
    }

    fn compress(&self, raw: &[u8], params: &CodecParams<'_>) -> Result<Vec<u8>> {
        self.compressor(params)
            .and_then(|mut c| c.compress(raw))
            .map_err(|e| CompressionError::codec("zstd", e))
    }

    fn compress_with_max_size(
        &self,
        raw: &[u8],
        params: &CodecParams<'_>,
        output: &mut [u8],
    ) -> Option<usize> {
        let mut compressor = self.compressor(params).ok()?;
        compressor.compress_to_buffer(raw, output).ok()
    }

    fn decompress(&self, compressed: &[u8], dict: Option<&[u8]>) -> Result<Vec<u8>> {
        let raw_len = self.content_size(compressed)?;
        let raw = self
            .decompressor(dict)?
            .decompress(compressed, raw_len)
            .map_err(|e| CompressionError::corruption("zstd", e.to_string()))?;

        if raw.len() != raw_len {
            return Err(CompressionError::corruption(
                "zstd",
                format!("decoded size {} != frame size {}", raw.len(), raw_len),
            ));
        }
        Ok(raw)
    }

    fn decompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        self.content_size(compressed).ok()
    }

    fn decompress_to_buffer(
        &self,
        compressed: &[u8],
        dict: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize> {
        self.decompressor(dict)?
            .decompress_to_buffer(compressed, output)
            .map_err(|e| CompressionError::corruption("zstd", e.to_string()))
    }
}
