//! Optimizer configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, OptimResult};

/// Whether we are minimizing or maximizing the cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "min")]
    Minimize,
    #[serde(alias = "max")]
    Maximize,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Minimize
    }
}

impl Direction {
    /// Sign applied to every cost before comparison, so that smaller is
    /// always better.
    pub fn coefficient(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }

    /// `true` when `candidate` is strictly better than `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        candidate * self.coefficient() < incumbent * self.coefficient()
    }
}

/// Top-level configuration shared by every search strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Dimensionality of the candidate vector.
    pub n_var: usize,

    pub direction: Direction,

    /// Number of full iterations performed by one run.
    #[serde(default = "default_repeat")]
    pub n_repeat: usize,

    /// Seed for randomized strategies. `None` draws a seed from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_repeat() -> usize {
    1
}

impl OptimizerConfig {
    pub fn new(n_var: usize, direction: Direction) -> Self {
        Self {
            n_var,
            direction,
            n_repeat: default_repeat(),
            seed: None,
        }
    }

    pub fn with_repeat(mut self, n: usize) -> Self {
        self.n_repeat = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> OptimResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_var == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.n_repeat == 0 {
            return Err(ConfigError::ZeroRepeat);
        }
        Ok(())
    }
}
