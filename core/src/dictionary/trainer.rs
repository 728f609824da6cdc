//! dictionary/trainer.rs
//! Turn buffered samples into a dictionary.
use tracing::{info, warn};

use crate::compression::options::CompressionOptions;
use crate::dictionary::types::{Dictionary, DictionaryOrigin};

/// Concatenated samples plus the length of each one, in arrival order.
pub struct SampleSet<'a> {
    pub data: &'a [u8],
    pub sizes: &'a [usize],
}

impl<'a> SampleSet<'a> {
    /// First `limit` bytes of the set, cutting the last sample short if needed.
    fn prefix(&self, limit: usize) -> (&'a [u8], Vec<usize>) {
        let data = &self.data[..limit.min(self.data.len())];
        let mut remaining = data.len();
        let mut sizes = Vec::with_capacity(self.sizes.len());
        for &size in self.sizes {
            if remaining == 0 {
                break;
            }
            let take = size.min(remaining);
            sizes.push(take);
            remaining -= take;
        }
        (data, sizes)
    }
}

/// Build the dictionary for a session from its samples.
///
/// - `zstd_max_train_bytes == 0`: the samples themselves, truncated to
///   `max_dict_bytes`.
/// - trainer enabled: a trainer pass over up to `zstd_max_train_bytes`.
///   If training fails the raw samples are used instead.
/// - trainer disabled: the trailing `max_dict_bytes` of up to
///   `zstd_max_train_bytes` of sample, used as raw content.
pub fn build_dictionary(samples: &SampleSet<'_>, options: &CompressionOptions) -> Dictionary {
    let max_dict = options.max_dict_bytes as usize;
    if samples.data.is_empty() || max_dict == 0 {
        return Dictionary::empty();
    }

    let train_bytes = options.zstd_max_train_bytes as usize;
    if train_bytes == 0 {
        return raw_samples(samples.data, max_dict);
    }

    let (data, sizes) = samples.prefix(train_bytes);
    if options.use_zstd_dict_trainer {
        match zstd::dict::from_continuous(data, &sizes, max_dict) {
            Ok(trained) if !trained.is_empty() => {
                info!(
                    samples = sizes.len(),
                    sample_bytes = data.len(),
                    dict_bytes = trained.len(),
                    "trained dictionary"
                );
                Dictionary::new(trained, DictionaryOrigin::Trained)
            }
            Ok(_) => {
                warn!("dictionary trainer returned nothing, using raw samples");
                raw_samples(samples.data, max_dict)
            }
            Err(e) => {
                warn!(error = %e, "dictionary training failed, using raw samples");
                raw_samples(samples.data, max_dict)
            }
        }
    } else {
        let start = data.len().saturating_sub(max_dict);
        let dict = Dictionary::new(data[start..].to_vec(), DictionaryOrigin::Finalized);
        info!(sample_bytes = data.len(), dict_bytes = dict.len(), "finalized dictionary");
        dict
    }
}

fn raw_samples(data: &[u8], max_dict: usize) -> Dictionary {
    let dict = Dictionary::new(data[..max_dict.min(data.len())].to_vec(), DictionaryOrigin::RawSamples);
    info!(dict_bytes = dict.len(), "dictionary from raw samples");
    dict
}
