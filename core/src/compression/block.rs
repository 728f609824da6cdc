//! compression/block.rs
//! One block through backend, ratio gate and fallback, plus the reader side.
use std::sync::Arc;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error};

use crate::compression::gate::RatioGate;
use crate::compression::options::CompressionOptions;
use crate::compression::registry::CompressionRegistry;
use crate::compression::selection::CodecChoice;
use crate::compression::types::{CodecParams, CompressionBackend, CompressionType};
use crate::dictionary::Dictionary;
use crate::types::{CompressionError, Result};

/// Why a block ended up stored the way it did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BlockOutcome {
    /// Stored with the selected backend.
    Compressed,
    /// Backend result missed the ratio gate or did not fit the bounded
    /// buffer. A backend error on the bounded path lands here too.
    RatioRejected,
    /// Backend returned a failure on the unbounded path; stored verbatim.
    BackendFailed,
    /// Backend broke its contract; stored verbatim.
    ContractViolation,
    /// `NONE` or `DISABLED` was selected.
    NotRequested,
}

/// A block as handed back to the file builder.
#[derive(Clone, Debug)]
pub struct CompressedBlock {
    /// Submission index within the session.
    pub index: u64,
    pub data: Bytes,
    /// The byte persisted next to `data`.
    pub compression_type: CompressionType,
    pub raw_len: usize,
    /// Set only when a non-empty dictionary was used.
    pub dictionary_id: Option<u32>,
    pub outcome: BlockOutcome,
}

impl CompressedBlock {
    fn stored(index: u64, raw: Bytes, outcome: BlockOutcome) -> Self {
        Self {
            index,
            raw_len: raw.len(),
            data: raw,
            compression_type: CompressionType::NONE,
            dictionary_id: None,
            outcome,
        }
    }

    pub fn stored_len(&self) -> usize {
        self.data.len()
    }

    pub fn is_compressed(&self) -> bool {
        self.outcome == BlockOutcome::Compressed
    }
}

/// Stateless per-block compressor; cheap to clone into worker threads.
#[derive(Clone, Debug)]
pub struct BlockCompressor {
    options: Arc<CompressionOptions>,
    gate: RatioGate,
}

impl BlockCompressor {
    pub fn new(options: Arc<CompressionOptions>) -> Self {
        let gate = RatioGate::from_options(&options);
        Self { options, gate }
    }

    pub fn gate(&self) -> RatioGate {
        self.gate
    }

    /// Never fails: anything short of an accepted compressed form stores
    /// `raw` verbatim under `NONE`.
    pub fn compress(
        &self,
        index: u64,
        raw: Bytes,
        choice: &CodecChoice,
        dict: Option<&Dictionary>,
    ) -> CompressedBlock {
        let Some(backend) = choice.backend.as_deref() else {
            return CompressedBlock::stored(index, raw, BlockOutcome::NotRequested);
        };
        let Some(max_accepted) = self.gate.max_accepted(raw.len()) else {
            // Empty input: no compressed size can beat an allowance of zero.
            return CompressedBlock::stored(index, raw, BlockOutcome::RatioRejected);
        };

        let info = backend.info();
        let dict_bytes = dict.filter(|_| info.supports_dict()).and_then(Dictionary::for_codec);
        let params = CodecParams::from_options(&self.options, dict_bytes);

        let mut out = vec![0u8; max_accepted];
        let written = match backend.compress_with_max_size(&raw, &params, &mut out) {
            Some(n) => n,
            None => {
                debug!(index, codec = info.name, raw_len = raw.len(), "block stored uncompressed");
                return CompressedBlock::stored(index, raw, BlockOutcome::RatioRejected);
            }
        };

        debug_assert!(
            written <= out.len(),
            "{} wrote {} bytes into a {} byte buffer",
            info.name,
            written,
            out.len()
        );
        if written > out.len() {
            error!(
                index,
                codec = info.name,
                written,
                capacity = out.len(),
                "backend overran bounded output buffer"
            );
            return CompressedBlock::stored(index, raw, BlockOutcome::ContractViolation);
        }

        if !self.gate.accepts(raw.len(), written) {
            return CompressedBlock::stored(index, raw, BlockOutcome::RatioRejected);
        }

        out.truncate(written);
        debug!(index, codec = info.name, raw_len = raw.len(), stored = written, "block compressed");
        CompressedBlock {
            index,
            data: Bytes::from(out),
            compression_type: choice.ctype,
            raw_len: raw.len(),
            dictionary_id: dict_bytes.and(dict.map(Dictionary::id)),
            outcome: BlockOutcome::Compressed,
        }
    }

    /// Unbounded variant: full `compress`, then the gate. Distinguishes a
    /// backend failure from a gate rejection.
    pub fn compress_unbounded(
        &self,
        index: u64,
        raw: Bytes,
        choice: &CodecChoice,
        dict: Option<&Dictionary>,
    ) -> CompressedBlock {
        let Some(backend) = choice.backend.as_deref() else {
            return CompressedBlock::stored(index, raw, BlockOutcome::NotRequested);
        };
        let info = backend.info();
        let dict_bytes = dict.filter(|_| info.supports_dict()).and_then(Dictionary::for_codec);
        let params = CodecParams::from_options(&self.options, dict_bytes);

        match backend.compress(&raw, &params) {
            Ok(compressed) if self.gate.accepts(raw.len(), compressed.len()) => CompressedBlock {
                index,
                raw_len: raw.len(),
                data: Bytes::from(compressed),
                compression_type: choice.ctype,
                dictionary_id: dict_bytes.and(dict.map(Dictionary::id)),
                outcome: BlockOutcome::Compressed,
            },
            Ok(_) => CompressedBlock::stored(index, raw, BlockOutcome::RatioRejected),
            Err(e) => {
                debug!(index, codec = info.name, error = %e, "backend failed, block stored uncompressed");
                CompressedBlock::stored(index, raw, BlockOutcome::BackendFailed)
            }
        }
    }
}

/// Reader side: invert a stored block given its type byte and, if the file
/// has one, its dictionary. Every failure is reported as `Corruption`.
#[derive(Clone, Debug)]
pub struct BlockDecompressor {
    registry: Arc<CompressionRegistry>,
}

impl BlockDecompressor {
    pub fn new(registry: Arc<CompressionRegistry>) -> Self {
        Self { registry }
    }

    fn backend_for(&self, ctype: CompressionType) -> Result<Arc<dyn CompressionBackend>> {
        if !ctype.is_block_code() {
            return Err(CompressionError::corruption(
                ctype.to_string(),
                "type code is not valid for a data block",
            ));
        }
        self.registry
            .resolve(ctype)
            .map_err(|_| CompressionError::corruption(ctype.to_string(), "type code is not registered"))
    }

    pub fn decompress(
        &self,
        ctype: CompressionType,
        data: &[u8],
        dict: Option<&Dictionary>,
    ) -> Result<Vec<u8>> {
        let backend = self.backend_for(ctype)?;
        backend
            .decompress(data, dict.and_then(Dictionary::for_codec))
            .map_err(|e| as_corruption(ctype, e))
    }

    /// `Ok(n)` bytes written; `Ok(0)` is a valid empty block.
    pub fn decompress_into(
        &self,
        ctype: CompressionType,
        data: &[u8],
        dict: Option<&Dictionary>,
        output: &mut [u8],
    ) -> Result<usize> {
        let backend = self.backend_for(ctype)?;
        backend
            .decompress_to_buffer(data, dict.and_then(Dictionary::for_codec), output)
            .map_err(|e| as_corruption(ctype, e))
    }

    pub fn decompressed_size(&self, ctype: CompressionType, data: &[u8]) -> Option<usize> {
        self.backend_for(ctype).ok()?.decompressed_size(data)
    }

    /// Like `decompress`, but also checks that `dict` is the dictionary the
    /// block was written with and that the size matches.
    pub fn decompress_block(&self, block: &CompressedBlock, dict: Option<&Dictionary>) -> Result<Vec<u8>> {
        let expected = block.dictionary_id.unwrap_or(0);
        let actual = dict.map(Dictionary::id).unwrap_or(0);
        if block.dictionary_id.is_some() && expected != actual {
            return Err(CompressionError::corruption(
                block.compression_type.to_string(),
                format!("dictionary id mismatch: block {expected:#010x}, given {actual:#010x}"),
            ));
        }
        let raw = self.decompress(block.compression_type, &block.data, dict)?;
        if raw.len() != block.raw_len {
            return Err(CompressionError::corruption(
                block.compression_type.to_string(),
                format!("size mismatch: expected {}, got {}", block.raw_len, raw.len()),
            ));
        }
        Ok(raw)
    }
}

fn as_corruption(ctype: CompressionType, e: CompressionError) -> CompressionError {
    match e {
        e @ CompressionError::Corruption { .. } => e,
        other => CompressionError::corruption(ctype.to_string(), other.to_string()),
    }
}

/// Free-function form of [`BlockDecompressor::decompress`].
pub fn decompress_block(
    registry: &Arc<CompressionRegistry>,
    ctype: CompressionType,
    data: &[u8],
    dict: Option<&Dictionary>,
) -> Result<Vec<u8>> {
    BlockDecompressor::new(Arc::clone(registry)).decompress(ctype, data, dict)
}

/// Free-function form of [`BlockDecompressor::decompress_into`].
pub fn decompress_block_into(
    registry: &Arc<CompressionRegistry>,
    ctype: CompressionType,
    data: &[u8],
    dict: Option<&Dictionary>,
    output: &mut [u8],
) -> Result<usize> {
    BlockDecompressor::new(Arc::clone(registry)).decompress_into(ctype, data, dict, output)
}
