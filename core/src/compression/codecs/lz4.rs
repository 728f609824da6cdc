//! codecs/lz4.rs
//! LZ4 block backend (lz4_flex), optionally primed with a dictionary.
//!
//! Wire layout: `[raw_len: u32 LE][lz4 block]`.
use lz4_flex::block::{
    compress_into, compress_into_with_dict, decompress_into, decompress_into_with_dict,
    get_maximum_output_size,
};

use crate::compression::types::{CodecCapabilities, CodecInfo, CodecParams, CompressionBackend};
use crate::constants::SIZE_PREFIX_LEN;
use crate::types::{CompressionError, Result};
use crate::utils::{read_size_prefix, write_size_prefix};

pub struct Lz4Backend;

/// Decode a size-prefixed LZ4 block into `out`, which must be exactly `raw_len` long.
pub(crate) fn decode_block(
    codec: &'static str,
    body: &[u8],
    dict: Option<&[u8]>,
    out: &mut [u8],
) -> Result<usize> {
    let written = match dict {
        Some(d) => decompress_into_with_dict(body, out, d),
        None => decompress_into(body, out),
    }
    .map_err(|e| CompressionError::corruption(codec, e.to_string()))?;

    if written != out.len() {
        return Err(CompressionError::corruption(
            codec,
            format!("decoded size {} != prefix {}", written, out.len()),
        ));
    }
    Ok(written)
}

/// LZ4 cannot expand a block by more than this factor.
const MAX_LZ4_RATIO: usize = 255;

pub(crate) fn split<'a>(codec: &'static str, compressed: &'a [u8]) -> Result<(usize, &'a [u8])> {
    let (raw_len, body) = read_size_prefix(compressed)
        .ok_or_else(|| CompressionError::corruption(codec, "missing size prefix"))?;
    if raw_len > body.len().saturating_mul(MAX_LZ4_RATIO) {
        return Err(CompressionError::corruption(
            codec,
            format!("prefix {raw_len} impossible for {} byte body", body.len()),
        ));
    }
    Ok((raw_len, body))
}

fn encode_into(raw: &[u8], out: &mut [u8], dict: Option<&[u8]>) -> Option<usize> {
    match dict {
        Some(d) => compress_into_with_dict(raw, out, d),
        None => compress_into(raw, out),
    }
    .ok()
}

impl CompressionBackend for Lz4Backend {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "lz4",
            capabilities: CodecCapabilities::EMBEDS_SIZE | CodecCapabilities::DICTIONARY,
            default_level: None,
        }
    }

    fn compress(&self, raw: &[u8], params: &CodecParams<'_>) -> Result<Vec<u8>> {
        let mut out = vec![0u8; SIZE_PREFIX_LEN + get_maximum_output_size(raw.len())];
        let n = self
            .compress_with_max_size(raw, params, &mut out)
            .ok_or_else(|| CompressionError::codec("lz4", "compression failed"))?;
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
        let body = &mut output[SIZE_PREFIX_LEN..];
        let worst = get_maximum_output_size(raw.len());
        if body.len() >= worst {
            return encode_into(raw, body, params.dict).map(|n| SIZE_PREFIX_LEN + n);
        }

        // lz4_flex refuses any destination below the worst case, so a tight
        // gate buffer goes through scratch space.
        let mut scratch = vec![0u8; worst];
        let n = encode_into(raw, &mut scratch, params.dict)?;
        body.get_mut(..n)?.copy_from_slice(&scratch[..n]);
        Some(SIZE_PREFIX_LEN + n)
    }

    fn decompress(&self, compressed: &[u8], dict: Option<&[u8]>) -> Result<Vec<u8>> {
        let (raw_len, body) = split("lz4", compressed)?;
        let mut raw = vec![0u8; raw_len];
        decode_block("lz4", body, dict, &mut raw)?;
        Ok(raw)
    }

    fn decompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        read_size_prefix(compressed).map(|(raw_len, _)| raw_len)
    }

    fn decompress_to_buffer(
        &self,
        compressed: &[u8],
        dict: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize> {
        let (raw_len, body) = split("lz4", compressed)?;
        let out = output.get_mut(..raw_len).ok_or_else(|| {
            CompressionError::corruption("lz4", format!("output buffer too small: {raw_len}"))
        })?;
        decode_block("lz4", body, dict, out)
    }
}
