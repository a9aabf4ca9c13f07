//! Progress reporting.
//!
//! Sinks are purely observational: they have no error channel, so a broken
//! sink can never abort an optimization.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// State of the run after one inner step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Step label, "Iter" for coordinates or "Part" for partitions.
    pub label: String,
    /// Zero-based repeat index.
    pub repeat: usize,
    pub n_repeat: usize,
    /// Zero-based step index within the repeat.
    pub step: usize,
    pub steps: usize,
    /// Best cost found by this step's scan.
    pub cost: f64,
}

impl ProgressUpdate {
    /// e.g. `Repeat: 1/2 | Iter: 3/8 | Cost = 0.1250`
    pub fn description(&self) -> String {
        format!(
            "Repeat: {}/{} | {}: {}/{} | Cost = {:.4}",
            self.repeat + 1,
            self.n_repeat,
            self.label,
            self.step + 1,
            self.steps,
            self.cost
        )
    }
}

/// Receives progress updates, once per inner step.
pub trait ProgressSink {
    /// Called once before the first step with the total step count of the run.
    fn start(&mut self, _total_steps: usize) {}

    fn update(&mut self, update: &ProgressUpdate);
}

/// Discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _update: &ProgressUpdate) {}
}

/// Logs every update through `tracing` at debug level.
#[derive(Debug, Clone, Default)]
pub struct TracingProgress {
    total_steps: usize,
    done: usize,
}

impl ProgressSink for TracingProgress {
    fn start(&mut self, total_steps: usize) {
        self.total_steps = total_steps;
        self.done = 0;
    }

    fn update(&mut self, update: &ProgressUpdate) {
        self.done += 1;
        debug!(
            "[{}/{}] {}",
            self.done,
            self.total_steps,
            update.description()
        );
    }
}

/// Forwards updates over a channel, e.g. to a UI thread.
///
/// Updates are dropped when the channel is full or the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: Sender<ProgressUpdate>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<ProgressUpdate>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn update(&mut self, update: &ProgressUpdate) {
        let _ = self.tx.try_send(update.clone());
    }
}
