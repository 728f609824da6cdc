//! codecs/zlib.rs
//! Deflate backend via flate2.
//!
//! Wire layout: `[raw_len: u32 LE][raw deflate stream]`. Blocks are always
//! written as raw deflate (no zlib header), matching the default negative
//! `window_bits`; the reader never needs the writer's options.
use std::io::{Read, Write};
use flate2::{write::DeflateEncoder, read::DeflateDecoder, Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::compression::constants::DEFAULT_LEVEL_ZLIB;
use crate::compression::types::{CodecCapabilities, CodecInfo, CodecParams, CompressionBackend};
use crate::constants::SIZE_PREFIX_LEN;
use crate::types::{CompressionError, Result};
use crate::utils::{read_size_prefix, write_size_prefix};

/// Deflate cannot expand input by more than this factor.
const MAX_DEFLATE_RATIO: usize = 1032;

pub struct ZlibBackend;

impl ZlibBackend {
    fn level(&self, params: &CodecParams<'_>) -> Compression {
        match self.info().resolve_level(params.level) {
            lvl @ 0..=9 => Compression::new(lvl as u32),
            _ => Compression::default(),
        }
    }

    fn split<'a>(&self, compressed: &'a [u8]) -> Result<(usize, &'a [u8])> {
        read_size_prefix(compressed)
            .ok_or_else(|| CompressionError::corruption("zlib", "missing size prefix"))
    }
}

impl CompressionBackend for ZlibBackend {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "zlib",
            capabilities: CodecCapabilities::EMBEDS_SIZE | CodecCapabilities::LEVELS,
            default_level: Some(DEFAULT_LEVEL_ZLIB),
        }
    }

    fn compress(&self, raw: &[u8], params: &CodecParams<'_>) -> Result<Vec<u8>> {
        let mut out = vec![0u8; SIZE_PREFIX_LEN];
        write_size_prefix(raw.len(), &mut out)
            .ok_or_else(|| CompressionError::codec("zlib", "block too large"))?;

        let mut enc = DeflateEncoder::new(out, self.level(params));
        enc.write_all(raw).map_err(|e| CompressionError::codec("zlib", e))?;
        enc.finish().map_err(|e| CompressionError::codec("zlib", e))
    }

    fn compress_with_max_size(
        &self,
        raw: &[u8],
        params: &CodecParams<'_>,
        output: &mut [u8],
    ) -> Option<usize> {
        write_size_prefix(raw.len(), output)?;
        let mut deflate = Compress::new(self.level(params), false);
        match deflate.compress(raw, &mut output[SIZE_PREFIX_LEN..], FlushCompress::Finish) {
            Ok(Status::StreamEnd) => Some(SIZE_PREFIX_LEN + deflate.total_out() as usize),
            _ => None,
        }
    }

    fn decompress(&self, compressed: &[u8], _dict: Option<&[u8]>) -> Result<Vec<u8>> {
        let (raw_len, body) = self.split(compressed)?;
        let mut raw = Vec::with_capacity(raw_len.min(body.len().saturating_mul(MAX_DEFLATE_RATIO)));
        DeflateDecoder::new(body)
            .read_to_end(&mut raw)
            .map_err(|e| CompressionError::corruption("zlib", e.to_string()))?;

        if raw.len() != raw_len {
            return Err(CompressionError::corruption(
                "zlib",
                format!("decoded size {} != prefix {}", raw.len(), raw_len),
            ));
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
        let (raw_len, body) = self.split(compressed)?;
        if raw_len == 0 {
            // Still validate the stream; inflate wants a non-empty output slice.
            return self.decompress(compressed, None).map(|_| 0);
        }
        let out = output.get_mut(..raw_len).ok_or_else(|| {
            CompressionError::corruption("zlib", format!("output buffer too small: {raw_len}"))
        })?;

        let mut inflate = Decompress::new(false);
        match inflate.decompress(body, out, FlushDecompress::Finish) {
            Ok(Status::StreamEnd) if inflate.total_out() as usize == raw_len => Ok(raw_len),
            Ok(_) => Err(CompressionError::corruption("zlib", "truncated or oversized stream")),
            Err(e) => Err(CompressionError::corruption("zlib", e.to_string())),
        }
    }
}
