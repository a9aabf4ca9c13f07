//! # eo-optimizer
//!
//! Derivative-free black-box optimization for EasyOptim.
//!
//! Provides the shared run lifecycle ([`OptimizerCore`]), two search
//! strategies ([`CoordinateSearch`] and [`PartitionSearch`]), lifecycle
//! [`Hooks`] with data aggregation, and fire-and-forget progress sinks.

mod callback;
mod coordinate;
mod engine;
mod hooks;
mod outcome;
mod partition;
mod progress;

pub use callback::{CostFunction, SumOfSquares};
pub use coordinate::CoordinateSearch;
pub use engine::{OptimizerCore, Run, SearchPass, StepScan};
pub use hooks::{no_data, Hooks, NoHooks};
pub use outcome::{OptimizationOutcome, RunId};
pub use partition::{draw_partition, partition_sizes, PartitionSearch};
pub use progress::{ChannelProgress, NoProgress, ProgressSink, ProgressUpdate, TracingProgress};

pub use eo_types::*;
