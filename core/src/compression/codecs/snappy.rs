//! codecs/snappy.rs
//! Snappy raw-block backend. The raw format carries its own length header.
use snap::raw::{decompress_len, max_compress_len, Decoder, Encoder};

use crate::compression::types::{CodecCapabilities, CodecInfo, CodecParams, CompressionBackend};
use crate::types::{CompressionError, Result};

pub struct SnappyBackend;

impl CompressionBackend for SnappyBackend {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "snappy",
            capabilities: CodecCapabilities::EMBEDS_SIZE,
            default_level: None,
        }
    }

    fn compress(&self, raw: &[u8], _params: &CodecParams<'_>) -> Result<Vec<u8>> {
        Encoder::new()
            .compress_vec(raw)
            .map_err(|e| CompressionError::codec("snappy", e))
    }

    fn compress_with_max_size(
        &self,
        raw: &[u8],
        _params: &CodecParams<'_>,
        output: &mut [u8],
    ) -> Option<usize> {
        // The encoder insists on a worst-case sized destination.
        if output.len() >= max_compress_len(raw.len()) {
            return Encoder::new().compress(raw, output).ok();
        }
        let compressed = Encoder::new().compress_vec(raw).ok()?;
        let out = output.get_mut(..compressed.len())?;
        out.copy_from_slice(&compressed);
        Some(compressed.len())
    }

    fn decompress(&self, compressed: &[u8], _dict: Option<&[u8]>) -> Result<Vec<u8>> {
        Decoder::new()
            .decompress_vec(compressed)
            .map_err(|e| CompressionError::corruption("snappy", e.to_string()))
    }

    fn decompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        decompress_len(compressed).ok()
    }

    fn decompress_to_buffer(
        &self,
        compressed: &[u8],
        _dict: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize> {
        let needed = decompress_len(compressed)
            .map_err(|e| CompressionError::corruption("snappy", e.to_string()))?;
        let out = output.get_mut(..needed).ok_or_else(|| {
            CompressionError::corruption("snappy", format!("output buffer too small: {needed}"))
        })?;
        Decoder::new()
            .decompress(compressed, out)
            .map_err(|e| CompressionError::corruption("snappy", e.to_string()))
    }
}
