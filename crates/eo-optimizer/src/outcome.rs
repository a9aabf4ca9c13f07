//! Result of an optimization run.

use chrono::{DateTime, Duration, Utc};
use eo_types::DataMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique optimization run identifier.
pub type RunId = Uuid;

/// Everything a finished run hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub run_id: RunId,
    /// Strategy that produced this outcome ("coordinate" or "partition").
    pub strategy: String,
    pub best_cost: f64,
    pub best_x: Vec<f64>,
    /// Hook-aggregated data, completed with the best record's own data.
    pub data: DataMap,
    /// Number of cost callback invocations, including the initial one.
    pub evaluations: usize,
    /// Best cost of each inner step's scan, in execution order.
    pub evolution: Vec<f64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl OptimizationOutcome {
    /// Split into the classic `(best_cost, best_x, data)` triple.
    pub fn into_parts(self) -> (f64, Vec<f64>, DataMap) {
        (self.best_cost, self.best_x, self.data)
    }

    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }
}
