//! compression/registry.rs
//! Type-code to backend mapping.
//!
//! Registration takes `&mut self`; sessions hold the registry behind an
//! `Arc`, so once any session can read it the registry can no longer change.
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::compression::codecs::{
    Lz4Backend, Lz4HcBackend, NoCompressionBackend, SnappyBackend, ZlibBackend, ZstdBackend,
};
use crate::compression::types::{CodecInfo, CompressionBackend, CompressionType};
use crate::types::{CompressionError, Result};

#[derive(Clone, Default)]
pub struct CompressionRegistry {
    backends: BTreeMap<CompressionType, Arc<dyn CompressionBackend>>,
}

impl CompressionRegistry {
    /// Empty registry; not even `NONE` is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in backend available in this build.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(CompressionType::NONE, Arc::new(NoCompressionBackend));
        registry.insert(CompressionType::SNAPPY, Arc::new(SnappyBackend));
        registry.insert(CompressionType::ZLIB, Arc::new(ZlibBackend));
        registry.insert(CompressionType::LZ4, Arc::new(Lz4Backend));
        registry.insert(CompressionType::LZ4HC, Arc::new(Lz4HcBackend));
        registry.insert(CompressionType::ZSTD, Arc::new(ZstdBackend));
        registry
    }

    fn insert(&mut self, ctype: CompressionType, backend: Arc<dyn CompressionBackend>) {
        self.backends.insert(ctype, backend);
    }

    /// Bind a custom backend to a code in `0x80..=0xfe`.
    ///
    /// Fails without touching the registry if the code is out of range or
    /// already taken.
    pub fn register_custom(
        &mut self,
        code: u8,
        backend: Arc<dyn CompressionBackend>,
    ) -> Result<CompressionType> {
        let ctype = CompressionType::custom(code)?;
        if self.backends.contains_key(&ctype) {
            return Err(CompressionError::CodeAlreadyRegistered(ctype));
        }
        debug!(code = %ctype, codec = backend.info().name, "registered custom backend");
        self.backends.insert(ctype, backend);
        Ok(ctype)
    }

    pub fn resolve(&self, ctype: CompressionType) -> Result<Arc<dyn CompressionBackend>> {
        self.backends
            .get(&ctype)
            .cloned()
            .ok_or(CompressionError::NotRegistered(ctype))
    }

    pub fn info(&self, ctype: CompressionType) -> Result<CodecInfo> {
        self.resolve(ctype).map(|b| b.info())
    }

    pub fn is_registered(&self, ctype: CompressionType) -> bool {
        self.backends.contains_key(&ctype)
    }

    pub fn registered_types(&self) -> impl Iterator<Item = CompressionType> + '_ {
        self.backends.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for CompressionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.backends.iter().map(|(k, v)| (k, v.info().name)))
            .finish()
    }
}
