//! codecs/none.rs
//! Verbatim storage for the `NONE` type code.
use crate::compression::types::{CodecCapabilities, CodecInfo, CodecParams, CompressionBackend};
use crate::types::{CompressionError, Result};

pub struct NoCompressionBackend;

impl CompressionBackend for NoCompressionBackend {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "none",
            capabilities: CodecCapabilities::EMBEDS_SIZE,
            default_level: None,
        }
    }

    fn compress(&self, raw: &[u8], _params: &CodecParams<'_>) -> Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn compress_with_max_size(
        &self,
        raw: &[u8],
        _params: &CodecParams<'_>,
        output: &mut [u8],
    ) -> Option<usize> {
        let out = output.get_mut(..raw.len())?;
        out.copy_from_slice(raw);
        Some(raw.len())
    }

    fn decompress(&self, compressed: &[u8], _dict: Option<&[u8]>) -> Result<Vec<u8>> {
        Ok(compressed.to_vec())
    }

    fn decompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        Some(compressed.len())
    }

    fn decompress_to_buffer(
        &self,
        compressed: &[u8],
        _dict: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize> {
        let out = output.get_mut(..compressed.len()).ok_or_else(|| {
            CompressionError::corruption("none", "output buffer too small")
        })?;
        out.copy_from_slice(compressed);
        Ok(compressed.len())
    }
}
