//! telemetry/timers.rs
//! Per-stage wall-clock accounting for one session.
use std::fmt;
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};

/// Session stages that are timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Copying block bytes into the dictionary sample buffer.
    Sample,
    /// Building the dictionary from samples.
    Train,
    /// Backend work, summed over blocks (and over workers in parallel mode).
    Compress,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Sample, Stage::Train, Stage::Compress];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Sample => "sample",
            Stage::Train => "train",
            Stage::Compress => "compress",
        })
    }
}

/// Accumulated time per stage. One field per stage so the JSON form is flat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    pub sample: Duration,
    pub train: Duration,
    pub compress: Duration,
}

impl StageTimes {
    fn slot(&mut self, stage: Stage) -> &mut Duration {
        match stage {
            Stage::Sample => &mut self.sample,
            Stage::Train => &mut self.train,
            Stage::Compress => &mut self.compress,
        }
    }

    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.slot(stage) += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Sample => self.sample,
            Stage::Train => self.train,
            Stage::Compress => self.compress,
        }
    }

    pub fn total(&self) -> Duration {
        Stage::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// True when every listed stage recorded some time.
    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.get(*s) > Duration::ZERO)
    }
}

/// Wall clock for a whole session plus its per-stage totals.
#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    started: Instant,
    finished: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { started: Instant::now(), finished: None, stage_times: StageTimes::default() }
    }

    /// Freeze `elapsed`. Later calls keep the first stop time.
    pub fn finish(&mut self) {
        self.finished.get_or_insert_with(Instant::now);
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
    }

    /// Run `f` and charge its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.stage_times.add(stage, start.elapsed());
        out
    }

    pub fn elapsed(&self) -> Duration {
        self.finished.unwrap_or_else(Instant::now).duration_since(self.started)
    }
}
