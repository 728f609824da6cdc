//! compression/selection.rs
//! Per-block choice of compression type.
//!
//! A session normally compresses every block with one type. Mixed selection
//! spreads blocks of a single file over several registered types; each block
//! still carries its own type code so the reader needs nothing extra.
use std::sync::Arc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::compression::registry::CompressionRegistry;
use crate::compression::types::{CodecInfo, CompressionBackend, CompressionType};
use crate::types::{CompressionError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSelection {
    Fixed(CompressionType),
    RoundRobin(Vec<CompressionType>),
    Random(Vec<CompressionType>),
}

impl Default for TypeSelection {
    fn default() -> Self {
        TypeSelection::Fixed(CompressionType::NONE)
    }
}

impl From<CompressionType> for TypeSelection {
    fn from(ctype: CompressionType) -> Self {
        TypeSelection::Fixed(ctype)
    }
}

/// A resolved type. `backend` is `None` for `NONE` and `DISABLED`, which
/// always store the block verbatim.
#[derive(Clone)]
pub struct CodecChoice {
    pub ctype: CompressionType,
    pub backend: Option<Arc<dyn CompressionBackend>>,
}

impl CodecChoice {
    pub fn info(&self) -> Option<CodecInfo> {
        self.backend.as_ref().map(|b| b.info())
    }

    pub fn supports_dict(&self) -> bool {
        self.info().is_some_and(|i| i.supports_dict())
    }
}

enum Mode {
    Fixed,
    RoundRobin { next: usize },
    Random(StdRng),
}

pub struct TypeSelector {
    choices: Vec<CodecChoice>,
    mode: Mode,
}

impl TypeSelector {
    /// Resolve every type up front so a missing backend fails at setup.
    pub fn resolve(selection: &TypeSelection, registry: &CompressionRegistry) -> Result<Self> {
        let (types, mode) = match selection {
            TypeSelection::Fixed(t) => (vec![*t], Mode::Fixed),
            TypeSelection::RoundRobin(ts) => (ts.clone(), Mode::RoundRobin { next: 0 }),
            TypeSelection::Random(ts) => (ts.clone(), Mode::Random(StdRng::from_entropy())),
        };
        if types.is_empty() {
            return Err(CompressionError::InvalidOptions(
                "type selection needs at least one compression type".into(),
            ));
        }

        let choices = types
            .into_iter()
            .map(|ctype| {
                if ctype == CompressionType::NONE || ctype.is_disabled() {
                    return Ok(CodecChoice { ctype: CompressionType::NONE, backend: None });
                }
                let backend = registry.resolve(ctype)?;
                Ok(CodecChoice { ctype, backend: Some(backend) })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { choices, mode })
    }

    pub fn next(&mut self) -> CodecChoice {
        let idx = match &mut self.mode {
            Mode::Fixed => 0,
            Mode::RoundRobin { next } => {
                let idx = *next;
                *next = (idx + 1) % self.choices.len();
                idx
            }
            Mode::Random(rng) => rng.gen_range(0..self.choices.len()),
        };
        self.choices[idx].clone()
    }

    pub fn any_supports_dict(&self) -> bool {
        self.choices.iter().any(CodecChoice::supports_dict)
    }

    pub fn choices(&self) -> &[CodecChoice] {
        &self.choices
    }
}
