// ## 📂 session/
// File-builder facing entry point: configure once, push blocks in order,
// collect them back in the same order.

pub mod core;
pub mod types;

pub use self::core::CompressionSession;
pub use self::types::{SessionConfig, SessionState, SessionSummary};
