//! Randomized-partition search.
//!
//! Each step draws a fresh random subset of coordinates and shifts all of
//! them jointly by each candidate offset in turn. The best offset is
//! committed to the current vector even when the result is worse than the
//! all-time best, so the search may drift away from it; the all-time best
//! record itself never regresses. The current vector also carries over from
//! one full iteration to the next.

use eo_types::{ConfigError, Evaluation, OptimResult, OptimizerConfig};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::callback::CostFunction;
use crate::engine::{OptimizerCore, Run, SearchPass};
use crate::hooks::{Hooks, NoHooks};
use crate::outcome::OptimizationOutcome;
use crate::progress::ProgressSink;

/// Draw `size` distinct coordinate indices out of `0..n_var`, uniformly and
/// without replacement.
pub fn draw_partition<R: Rng + ?Sized>(rng: &mut R, n_var: usize, size: usize) -> Vec<usize> {
    index::sample(rng, n_var, size.min(n_var)).into_vec()
}

/// Convert fractions of `n_var` into partition sizes, truncating.
pub fn partition_sizes(fractions: &[f64], n_var: usize) -> Result<Vec<usize>, ConfigError> {
    fractions
        .iter()
        .enumerate()
        .map(|(index, &fraction)| {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigError::FractionOutOfRange { index, fraction });
            }
            Ok((fraction * n_var as f64).floor() as usize)
        })
        .collect()
}

/// Joint perturbation of random coordinate groups.
pub struct PartitionSearch<H = NoHooks> {
    core: OptimizerCore<H>,
    rng: StdRng,
}

impl PartitionSearch<NoHooks> {
    /// Partition draws are reproducible when the config carries a seed.
    pub fn new(config: OptimizerConfig) -> OptimResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            core: OptimizerCore::new(config)?,
            rng,
        })
    }
}

impl<H: Hooks> PartitionSearch<H> {
    pub fn with_hooks<H2: Hooks>(self, hooks: H2) -> PartitionSearch<H2> {
        PartitionSearch {
            core: self.core.with_hooks(hooks),
            rng: self.rng,
        }
    }

    pub fn with_progress(self, sink: impl ProgressSink + 'static) -> Self {
        Self {
            core: self.core.with_progress(sink),
            rng: self.rng,
        }
    }

    pub fn register_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&[f64]) -> Result<Evaluation, eo_types::CallbackError> + 'static,
    {
        self.core.register_callback(callback);
    }

    pub fn register_cost_function(&mut self, cost: impl CostFunction + 'static) {
        self.core.register_cost_function(cost);
    }

    pub fn config(&self) -> &OptimizerConfig {
        self.core.config()
    }

    pub fn hooks(&self) -> &H {
        self.core.hooks()
    }

    pub fn into_hooks(self) -> H {
        self.core.into_hooks()
    }

    /// Search with additive `values` (offsets) over partitions whose sizes
    /// are `fractions` of `n_var`. Both slices must have the same length.
    pub fn run(
        &mut self,
        values: &[f64],
        fractions: &[f64],
        x_init: Option<Vec<f64>>,
    ) -> OptimResult<OptimizationOutcome> {
        if values.is_empty() {
            return Err(ConfigError::EmptyValues.into());
        }
        if values.len() != fractions.len() {
            return Err(ConfigError::LengthMismatch {
                values: values.len(),
                fractions: fractions.len(),
            }
            .into());
        }
        let sizes = partition_sizes(fractions, self.core.config().n_var)?;
        debug!("Partition sizes: {:?}", sizes);

        let mut pass = PartitionPass {
            values,
            sizes,
            rng: &mut self.rng,
        };
        self.core.run_with(&mut pass, x_init)
    }
}

struct PartitionPass<'r> {
    values: &'r [f64],
    sizes: Vec<usize>,
    rng: &'r mut StdRng,
}

impl SearchPass for PartitionPass<'_> {
    fn name(&self) -> &'static str {
        "partition"
    }

    fn step_label(&self) -> &'static str {
        "Part"
    }

    fn steps_per_pass(&self, _n_var: usize) -> usize {
        self.sizes.len()
    }

    fn full_iteration<H: Hooks>(&mut self, run: &mut Run<'_, H>) -> OptimResult<()> {
        for (step, &size) in self.sizes.iter().enumerate() {
            let partition = draw_partition(self.rng, run.n_var(), size);
            let base = run.current_x().to_vec();
            let mut x = base.clone();
            let mut scan = run.scan();
            for &offset in self.values {
                for &j in &partition {
                    x[j] = run.constrain(base[j] + offset);
                }
                let (cost, data) = run.evaluate(&x)?;
                scan.offer(&x, cost, data);
            }
            let best = scan.into_best().ok_or(ConfigError::EmptyValues)?;
            run.set_current_x(best.x.clone());
            run.commit_step(step, best)?;
        }
        Ok(())
    }
}
