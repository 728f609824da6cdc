//! telemetry/mod.rs
//! Counters, stage timers, and the immutable snapshot a session returns.

pub mod counters;
pub mod snapshot;
pub mod timers;

pub use counters::*;
pub use snapshot::*;
pub use timers::*;
