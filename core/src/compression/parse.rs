//! compression/parse.rs
//! Option-string parsing.
//!
//! Two syntaxes are accepted:
//! - `{level=6;strategy=7}` (braces optional), one `name=value` per field.
//! - the deprecated colon form
//!   `window_bits:level:strategy:max_dict_bytes[:zstd_max_train_bytes[:parallel_threads[:enabled[:max_dict_buffer_bytes[:use_zstd_dict_trainer]]]]]`.
use std::str::FromStr;

use crate::compression::options::CompressionOptions;
use crate::types::{CompressionError, Result};

/// Field order of the deprecated colon syntax.
const COLON_FIELDS: [&str; 9] = [
    "window_bits",
    "level",
    "strategy",
    "max_dict_bytes",
    "zstd_max_train_bytes",
    "parallel_threads",
    "enabled",
    "max_dict_buffer_bytes",
    "use_zstd_dict_trainer",
];

/// Minimum field count of the colon syntax.
const COLON_MIN_FIELDS: usize = 4;

fn invalid(msg: impl Into<String>) -> CompressionError {
    CompressionError::InvalidOptions(msg.into())
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid(format!("{key}: cannot parse {value:?}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(invalid(format!("{key}: cannot parse {other:?} as bool"))),
    }
}

impl CompressionOptions {
    /// Apply one `name=value` pair.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        match key.trim() {
            "window_bits" => self.window_bits = parse_num(key, value)?,
            "level" => self.level = parse_num(key, value)?,
            "strategy" => self.strategy = parse_num(key, value)?,
            "max_dict_bytes" => self.max_dict_bytes = parse_num(key, value)?,
            "zstd_max_train_bytes" => self.zstd_max_train_bytes = parse_num(key, value)?,
            "parallel_threads" => self.parallel_threads = parse_num(key, value)?,
            "enabled" => self.enabled = parse_bool(key, value)?,
            "max_dict_buffer_bytes" => self.max_dict_buffer_bytes = parse_num(key, value)?,
            "use_zstd_dict_trainer" => self.use_zstd_dict_trainer = parse_bool(key, value)?,
            "max_compressed_bytes_per_kb" => {
                self.max_compressed_bytes_per_kb = parse_num(key, value)?
            }
            "checksum" => self.checksum = parse_bool(key, value)?,
            other => return Err(invalid(format!("unknown option {other:?}"))),
        }
        Ok(())
    }

    fn parse_colon_form(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < COLON_MIN_FIELDS || parts.len() > COLON_FIELDS.len() {
            return Err(invalid(format!(
                "colon form needs {}..={} fields, got {}",
                COLON_MIN_FIELDS,
                COLON_FIELDS.len(),
                parts.len()
            )));
        }
        let mut options = Self::default();
        for (key, value) in COLON_FIELDS.iter().zip(parts) {
            options.set_field(key, value)?;
        }
        Ok(options)
    }

    fn parse_map_form(s: &str) -> Result<Self> {
        let body = s.trim();
        let body = body
            .strip_prefix('{')
            .and_then(|b| b.strip_suffix('}'))
            .unwrap_or(body);

        let mut options = Self::default();
        for pair in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected name=value, got {pair:?}")))?;
            options.set_field(key, value)?;
        }
        Ok(options)
    }
}

impl FromStr for CompressionOptions {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        let options = if s.contains('=') || s.trim().starts_with('{') {
            Self::parse_map_form(s)?
        } else {
            Self::parse_colon_form(s)?
        };
        options.validate()?;
        Ok(options)
    }
}
