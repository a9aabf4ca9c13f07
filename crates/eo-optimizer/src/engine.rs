//! Run lifecycle shared by every search strategy.
//!
//! [`OptimizerCore::run_with`] owns the sequence of a run:
//!
//! 1. resolve the initial vector (zeros when none is given),
//! 2. `begin` hook,
//! 3. bootstrap evaluation of the initial vector, which seeds the all-time best,
//! 4. `n_repeat` full iterations, each wrapped by `before_full_iter` /
//!    `after_full_iter` and delegated to a [`SearchPass`],
//! 5. completion of the aggregated data with the best record's data,
//! 6. `end` hook.
//!
//! Strategies only implement [`SearchPass::full_iteration`], using [`Run`] to
//! evaluate candidates and to commit each inner step.

use chrono::Utc;
use eo_types::{
    merge_missing, merge_overwrite, BestRecord, ConfigError, DataMap, Direction, Evaluation,
    OptimError, OptimResult, OptimizerConfig,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::callback::CostFunction;
use crate::hooks::{absorb, Hooks, NoHooks};
use crate::outcome::OptimizationOutcome;
use crate::progress::{NoProgress, ProgressSink, ProgressUpdate};

/// One full iteration of a search strategy.
pub trait SearchPass {
    /// Strategy name recorded in the outcome.
    fn name(&self) -> &'static str;

    /// Progress label of one inner step.
    fn step_label(&self) -> &'static str;

    /// Number of inner steps in one full iteration.
    fn steps_per_pass(&self, n_var: usize) -> usize;

    fn full_iteration<H: Hooks>(&mut self, run: &mut Run<'_, H>) -> OptimResult<()>;
}

/// Configuration, cost callback, hooks and progress sink of an optimizer.
pub struct OptimizerCore<H = NoHooks> {
    config: OptimizerConfig,
    callback: Option<Box<dyn CostFunction>>,
    hooks: H,
    progress: Box<dyn ProgressSink>,
}

impl OptimizerCore<NoHooks> {
    pub fn new(config: OptimizerConfig) -> OptimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            callback: None,
            hooks: NoHooks,
            progress: Box::new(NoProgress),
        })
    }
}

impl<H: Hooks> OptimizerCore<H> {
    /// Replace the hooks, keeping everything else.
    pub fn with_hooks<H2: Hooks>(self, hooks: H2) -> OptimizerCore<H2> {
        OptimizerCore {
            config: self.config,
            callback: self.callback,
            hooks,
            progress: self.progress,
        }
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Register a closure as the cost callback.
    pub fn register_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&[f64]) -> Result<Evaluation, eo_types::CallbackError> + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Register any [`CostFunction`] implementation as the cost callback.
    pub fn register_cost_function(&mut self, cost: impl CostFunction + 'static) {
        self.callback = Some(Box::new(cost));
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    /// Run `n_repeat` full iterations of `pass`.
    pub fn run_with<P: SearchPass>(
        &mut self,
        pass: &mut P,
        x_init: Option<Vec<f64>>,
    ) -> OptimResult<OptimizationOutcome> {
        let n_var = self.config.n_var;
        let x = match x_init {
            Some(x) if x.len() != n_var => {
                return Err(ConfigError::InitialVectorLength {
                    expected: n_var,
                    actual: x.len(),
                }
                .into())
            }
            Some(x) => x,
            None => vec![0.0; n_var],
        };
        let callback = self
            .callback
            .as_deref_mut()
            .ok_or(ConfigError::MissingCallback)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let steps_per_pass = pass.steps_per_pass(n_var);
        info!(
            "Starting {} search run {}: n_var={}, direction={:?}, repeats={}",
            pass.name(),
            run_id,
            n_var,
            self.config.direction,
            self.config.n_repeat
        );

        let mut data = DataMap::new();
        absorb("begin", self.hooks.begin(), &mut data)?;

        let (cost, best_data) = evaluate(callback, &x)?;
        debug!("Initial cost: {}", cost);
        self.progress.start(steps_per_pass * self.config.n_repeat);

        let mut run = Run {
            config: &self.config,
            callback,
            hooks: &mut self.hooks,
            progress: &mut *self.progress,
            step_label: pass.step_label(),
            steps_per_pass,
            i_full_iter: 0,
            all_time_best: BestRecord::new(x.clone(), cost, best_data),
            current_x: x,
            data,
            evaluations: 1,
            evolution: Vec::with_capacity(steps_per_pass * self.config.n_repeat),
        };

        for i_full_iter in 0..run.config.n_repeat {
            run.i_full_iter = i_full_iter;
            absorb("before_full_iter", run.hooks.before_full_iter(), &mut run.data)?;
            pass.full_iteration(&mut run)?;
            let returned = run.hooks.after_full_iter(
                i_full_iter,
                run.all_time_best.cost,
                &run.all_time_best.x,
                &run.data,
            );
            absorb("after_full_iter", returned, &mut run.data)?;
            debug!(
                "Repeat {}/{} done, best cost {}",
                i_full_iter + 1,
                run.config.n_repeat,
                run.all_time_best.cost
            );
        }

        let Run {
            all_time_best,
            mut data,
            evaluations,
            evolution,
            ..
        } = run;
        merge_missing(&mut data, &all_time_best.data);
        absorb("end", self.hooks.end(), &mut data)?;

        info!(
            "Finished {} search run {}: best cost {} after {} evaluations",
            pass.name(),
            run_id,
            all_time_best.cost,
            evaluations
        );

        Ok(OptimizationOutcome {
            run_id,
            strategy: pass.name().to_string(),
            best_cost: all_time_best.cost,
            best_x: all_time_best.x,
            data,
            evaluations,
            evolution,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

fn evaluate(callback: &mut dyn CostFunction, x: &[f64]) -> OptimResult<(f64, DataMap)> {
    let evaluation = callback.evaluate(x).map_err(|e| {
        warn!("Cost callback failed: {}", e);
        OptimError::callback(e)
    })?;
    evaluation.into_checked().map_err(|violation| {
        warn!("Cost callback broke its contract: {}", violation);
        OptimError::from(violation)
    })
}

/// Mutable state of a run in progress, handed to [`SearchPass`]es.
pub struct Run<'a, H> {
    config: &'a OptimizerConfig,
    callback: &'a mut (dyn CostFunction + 'static),
    hooks: &'a mut H,
    progress: &'a mut (dyn ProgressSink + 'static),
    step_label: &'static str,
    steps_per_pass: usize,
    i_full_iter: usize,
    current_x: Vec<f64>,
    all_time_best: BestRecord,
    data: DataMap,
    evaluations: usize,
    evolution: Vec<f64>,
}

impl<'a, H: Hooks> Run<'a, H> {
    pub fn n_var(&self) -> usize {
        self.config.n_var
    }

    pub fn direction(&self) -> Direction {
        self.config.direction
    }

    /// Zero-based index of the full iteration in progress.
    pub fn i_full_iter(&self) -> usize {
        self.i_full_iter
    }

    /// Vector the next step starts from.
    pub fn current_x(&self) -> &[f64] {
        &self.current_x
    }

    pub fn set_current_x(&mut self, x: Vec<f64>) {
        self.current_x = x;
    }

    /// Restart from the all-time best vector.
    pub fn reset_to_best(&mut self) {
        self.current_x = self.all_time_best.x.clone();
    }

    pub fn all_time_best(&self) -> &BestRecord {
        &self.all_time_best
    }

    pub fn data(&self) -> &DataMap {
        &self.data
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Apply the hooks' value constraint.
    pub fn constrain(&self, value: f64) -> f64 {
        self.hooks.value_constraint(value)
    }

    /// Evaluate a full candidate vector.
    pub fn evaluate(&mut self, x: &[f64]) -> OptimResult<(f64, DataMap)> {
        let result = evaluate(self.callback, x)?;
        self.evaluations += 1;
        Ok(result)
    }

    /// Fresh scan for one inner step.
    pub fn scan(&self) -> StepScan {
        StepScan::new(self.config.direction)
    }

    /// Close an inner step: promote its best to all-time best when strictly
    /// better, report progress, then call `after_iter` with the all-time
    /// best's data overlaid by the aggregated data.
    pub fn commit_step(&mut self, step: usize, step_best: BestRecord) -> OptimResult<()> {
        let step_cost = step_best.cost;
        self.evolution.push(step_cost);

        if self
            .config
            .direction
            .is_better(step_best.cost, self.all_time_best.cost)
        {
            debug!(
                "New best cost {} (was {}) at repeat {}, step {}",
                step_best.cost, self.all_time_best.cost, self.i_full_iter, step
            );
            self.all_time_best = step_best;
            let returned = self.hooks.on_best(
                &self.all_time_best.x,
                self.all_time_best.cost,
                &self.all_time_best.data,
            );
            absorb("on_best", returned, &mut self.data)?;
        }

        self.progress.update(&ProgressUpdate {
            label: self.step_label.to_string(),
            repeat: self.i_full_iter,
            n_repeat: self.config.n_repeat,
            step,
            steps: self.steps_per_pass,
            cost: step_cost,
        });

        let mut view = self.all_time_best.data.clone();
        merge_overwrite(&mut view, self.data.clone());
        let returned = self.hooks.after_iter(
            step,
            self.all_time_best.cost,
            &self.all_time_best.x,
            &view,
        );
        absorb("after_iter", returned, &mut self.data)?;
        Ok(())
    }
}

/// Best candidate of one scan over candidate values.
///
/// The first candidate offered is always accepted; later ones only when
/// strictly better, so among equal costs the first one found wins.
#[derive(Debug, Clone)]
pub struct StepScan {
    direction: Direction,
    best: Option<BestRecord>,
}

impl StepScan {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            best: None,
        }
    }

    /// Offer a candidate. Returns `true` if it became the scan best.
    pub fn offer(&mut self, x: &[f64], cost: f64, data: DataMap) -> bool {
        let accept = match &self.best {
            None => true,
            Some(best) => self.direction.is_better(cost, best.cost),
        };
        if accept {
            self.best = Some(BestRecord::new(x.to_vec(), cost, data));
        }
        accept
    }

    pub fn best(&self) -> Option<&BestRecord> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<BestRecord> {
        self.best
    }
}
