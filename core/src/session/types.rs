//! session/types.rs
//! Session configuration and the summary returned by `finish`.
use serde::{Deserialize, Serialize};

use crate::compression::block::CompressedBlock;
use crate::compression::options::CompressionOptions;
use crate::compression::selection::TypeSelection;
use crate::dictionary::{Dictionary, SamplingPolicy};
use crate::telemetry::TelemetrySnapshot;
use crate::types::{CompressionError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub options: CompressionOptions,
    pub selection: TypeSelection,
    /// Target size of the file being built; 0 means none. Also caps the
    /// dictionary sample buffer.
    pub file_size_target: u64,
    pub sampling: SamplingPolicy,
}

impl SessionConfig {
    pub fn new(options: CompressionOptions, selection: impl Into<TypeSelection>) -> Self {
        Self { options, selection: selection.into(), ..Self::default() }
    }

    pub fn with_file_size_target(mut self, bytes: u64) -> Self {
        self.file_size_target = bytes;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CompressionError::InvalidOptions(e.to_string()))?;
        config.options.validate()?;
        Ok(config)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Finished,
    Aborted,
}

/// Everything the file builder still needs once a session is done.
#[derive(Debug)]
pub struct SessionSummary {
    /// Blocks not already handed out by `take_ready`, in order.
    pub blocks: Vec<CompressedBlock>,
    /// To be persisted once per file; empty if no dictionary was used.
    pub dictionary: Dictionary,
    pub telemetry: TelemetrySnapshot,
}
