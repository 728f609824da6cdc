// ## 📂 dictionary/
// Shared-dictionary support: sample buffering under a memory budget, then
// a one-time build of the immutable dictionary blob.

pub mod accountant;
pub mod sampler;
pub mod trainer;
pub mod types;

pub use accountant::{CacheMemoryAccountant, MemoryAccountant, MemoryCharge, UnlimitedAccountant};
pub use sampler::{DictionarySampler, SampleOutcome, SamplerState};
pub use trainer::{build_dictionary, SampleSet};
pub use types::{Dictionary, DictionaryOrigin, SamplingPolicy};
