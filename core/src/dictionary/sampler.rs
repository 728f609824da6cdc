//! dictionary/sampler.rs
//! Sample buffering state machine.
//!
//! `Collecting -> Finalizing -> Finalized`, or `Collecting -> Abandoned`.
//! A denied memory charge never fails the session: buffering stops and
//! the dictionary is built from whatever is already held.
use std::sync::Arc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::compression::options::CompressionOptions;
use crate::dictionary::accountant::{MemoryAccountant, MemoryCharge};
use crate::dictionary::trainer::{build_dictionary, SampleSet};
use crate::dictionary::types::{Dictionary, SamplingPolicy};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SamplerState {
    Collecting,
    Finalizing,
    Finalized,
    Abandoned,
}

impl SamplerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SamplerState::Finalized | SamplerState::Abandoned)
    }
}

/// Result of offering one block to the sampler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// `n` bytes were buffered; still collecting.
    Buffered(usize),
    /// `n` bytes were buffered and the buffer limit is now reached.
    Full(usize),
    /// The accountant refused the charge; nothing from this block was kept.
    Denied,
    /// Sampler is not collecting.
    Ignored,
}

pub struct DictionarySampler {
    state: SamplerState,
    options: Arc<CompressionOptions>,
    policy: SamplingPolicy,
    limit: Option<usize>,
    buffer: Vec<u8>,
    sample_sizes: Vec<usize>,
    charge: MemoryCharge,
    denials: u64,
    dictionary: Option<Dictionary>,
}

/// Smaller of the non-zero limits, `None` if both are zero.
fn buffer_limit(max_dict_buffer_bytes: u64, file_size_target: u64) -> Option<usize> {
    [max_dict_buffer_bytes, file_size_target]
        .into_iter()
        .filter(|&b| b > 0)
        .min()
        .map(|b| usize::try_from(b).unwrap_or(usize::MAX))
}

impl DictionarySampler {
    /// `file_size_target` of 0 means the file has no size target.
    pub fn new(
        options: Arc<CompressionOptions>,
        policy: SamplingPolicy,
        file_size_target: u64,
        accountant: Arc<dyn MemoryAccountant>,
    ) -> Self {
        let state = if options.dictionary_enabled() {
            SamplerState::Collecting
        } else {
            SamplerState::Abandoned
        };
        let limit = buffer_limit(options.max_dict_buffer_bytes, file_size_target);
        Self {
            state,
            options,
            policy,
            limit,
            buffer: Vec::new(),
            sample_sizes: Vec::new(),
            charge: MemoryCharge::new(accountant),
            denials: 0,
            dictionary: None,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == SamplerState::Collecting
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn charged_bytes(&self) -> usize {
        self.charge.charged()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_sizes.len()
    }

    pub fn denials(&self) -> u64 {
        self.denials
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    pub fn offer(&mut self, block: &[u8]) -> SampleOutcome {
        if self.state != SamplerState::Collecting {
            return SampleOutcome::Ignored;
        }

        let mut sample = self.policy.sample(block);
        if let Some(limit) = self.limit {
            let room = limit.saturating_sub(self.buffer.len());
            sample = &sample[..sample.len().min(room)];
        }

        if !self.charge.try_grow(sample.len()) {
            self.denials += 1;
            self.state = if self.buffer.is_empty() {
                SamplerState::Abandoned
            } else {
                SamplerState::Finalizing
            };
            warn!(
                requested = sample.len(),
                buffered = self.buffer.len(),
                state = ?self.state,
                "dictionary sample charge denied"
            );
            return SampleOutcome::Denied;
        }

        if !sample.is_empty() {
            self.buffer.extend_from_slice(sample);
            self.sample_sizes.push(sample.len());
        }

        if self.limit.is_some_and(|limit| self.buffer.len() >= limit) {
            debug!(buffered = self.buffer.len(), "dictionary sample buffer full");
            self.state = SamplerState::Finalizing;
            SampleOutcome::Full(sample.len())
        } else {
            SampleOutcome::Buffered(sample.len())
        }
    }

    /// Build the dictionary now. Idempotent; from `Abandoned` it yields the
    /// empty dictionary. The memory charge is returned either way.
    pub fn finalize(&mut self) -> Dictionary {
        if let Some(dict) = &self.dictionary {
            return dict.clone();
        }

        let dict = match self.state {
            SamplerState::Collecting | SamplerState::Finalizing => {
                self.state = SamplerState::Finalizing;
                let samples = SampleSet { data: &self.buffer, sizes: &self.sample_sizes };
                let dict = build_dictionary(&samples, &self.options);
                self.state = SamplerState::Finalized;
                dict
            }
            SamplerState::Finalized | SamplerState::Abandoned => Dictionary::empty(),
        };

        self.release_buffer();
        self.dictionary = Some(dict.clone());
        dict
    }

    /// Stop sampling and give the memory back without building anything.
    pub fn abandon(&mut self) {
        if self.state != SamplerState::Finalized {
            self.state = SamplerState::Abandoned;
        }
        self.release_buffer();
    }

    fn release_buffer(&mut self) {
        self.buffer = Vec::new();
        self.sample_sizes = Vec::new();
        self.charge.release_all();
    }
}
