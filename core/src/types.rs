use std::io;
use thiserror::Error;

use crate::compression::CompressionType;

/// Unified error for registry setup, block compression and block reads.
/// - Setup-time variants (`CodeOutOfRange`, `CodeAlreadyRegistered`, `InvalidOptions`)
///   are only ever returned before any block traffic.
/// - `CodecFailed` is recovered inside the block compressor; callers of
///   `CompressionSession` never see it for a block write.
/// - `Corruption` is fatal for the read that produced it.
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("compression type {0} is not registered")]
    NotRegistered(CompressionType),

    #[error("custom compression code {code:#04x} is outside 0x80..=0xfe")]
    CodeOutOfRange { code: u8 },

    #[error("compression type {0} is already registered")]
    CodeAlreadyRegistered(CompressionType),

    #[error("invalid compression options: {0}")]
    InvalidOptions(String),

    #[error("codec {codec} failed: {msg}")]
    CodecFailed { codec: &'static str, msg: String },

    #[error("corruption in {codec} block: {msg}")]
    Corruption { codec: String, msg: String },

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CompressionError {
    pub fn codec(codec: &'static str, e: impl std::fmt::Display) -> Self {
        CompressionError::CodecFailed { codec, msg: e.to_string() }
    }

    pub fn corruption(codec: impl Into<String>, msg: impl Into<String>) -> Self {
        CompressionError::Corruption { codec: codec.into(), msg: msg.into() }
    }

    /// True for errors that must be rejected at session setup.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CompressionError::NotRegistered(_)
                | CompressionError::CodeOutOfRange { .. }
                | CompressionError::CodeAlreadyRegistered(_)
                | CompressionError::InvalidOptions(_)
        )
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, CompressionError::Corruption { .. })
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
