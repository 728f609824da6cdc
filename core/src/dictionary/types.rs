//! dictionary/types.rs
//! Finalized dictionary blob and sampling knobs.
use std::fmt;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::utils::compute_checksum;

/// How a dictionary came to be.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DictionaryOrigin {
    /// Nothing was sampled, or dictionaries are off.
    Empty,
    /// Concatenated samples used verbatim.
    RawSamples,
    /// Output of a trainer pass.
    Trained,
    /// Sample content shaped to the target size without training.
    Finalized,
    /// Read back from a file on the decompression side.
    Loaded,
}

/// Immutable dictionary shared by every block compressed after finalization.
///
/// `id` is the CRC32 of the bytes (0 for an empty dictionary); the reader
/// uses it to check it was handed the right blob.
#[derive(Clone, PartialEq, Eq)]
pub struct Dictionary {
    bytes: Bytes,
    id: u32,
    origin: DictionaryOrigin,
}

impl Dictionary {
    pub fn new(bytes: impl Into<Bytes>, origin: DictionaryOrigin) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Self::empty();
        }
        let id = compute_checksum(&bytes);
        Self { bytes, id, origin }
    }

    pub fn empty() -> Self {
        Self { bytes: Bytes::new(), id: 0, origin: DictionaryOrigin::Empty }
    }

    /// Rebuild a dictionary on the read side from its persisted blob.
    pub fn from_persisted(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, DictionaryOrigin::Loaded)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn origin(&self) -> DictionaryOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes to hand a backend; `None` for the empty dictionary.
    pub fn for_codec(&self) -> Option<&[u8]> {
        (!self.is_empty()).then_some(self.as_slice())
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("id", &format_args!("{:#010x}", self.id))
            .field("len", &self.bytes.len())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Which part of each block is offered to the sampler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingPolicy {
    #[default]
    WholeBlock,
    /// First `n` bytes of each block.
    Prefix(usize),
}

impl SamplingPolicy {
    pub fn sample<'a>(&self, block: &'a [u8]) -> &'a [u8] {
        match *self {
            SamplingPolicy::WholeBlock => block,
            SamplingPolicy::Prefix(n) => &block[..n.min(block.len())],
        }
    }
}
