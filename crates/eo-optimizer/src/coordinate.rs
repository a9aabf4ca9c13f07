//! Sequential coordinate search.
//!
//! One full iteration visits every coordinate in order. For each one, every
//! candidate value is tried in place while the other coordinates stay fixed;
//! the coordinate keeps its best value before the next one is scanned.
//! There is no backtracking. After the pass the search restarts from the
//! all-time best vector.

use eo_types::{ConfigError, Evaluation, OptimResult, OptimizerConfig};

use crate::callback::CostFunction;
use crate::engine::{OptimizerCore, Run, SearchPass};
use crate::hooks::{Hooks, NoHooks};
use crate::outcome::OptimizationOutcome;
use crate::progress::ProgressSink;

/// Coordinate-by-coordinate search over a fixed candidate value set.
pub struct CoordinateSearch<H = NoHooks> {
    core: OptimizerCore<H>,
}

impl CoordinateSearch<NoHooks> {
    pub fn new(config: OptimizerConfig) -> OptimResult<Self> {
        Ok(Self {
            core: OptimizerCore::new(config)?,
        })
    }
}

impl<H: Hooks> CoordinateSearch<H> {
    pub fn with_hooks<H2: Hooks>(self, hooks: H2) -> CoordinateSearch<H2> {
        CoordinateSearch {
            core: self.core.with_hooks(hooks),
        }
    }

    pub fn with_progress(self, sink: impl ProgressSink + 'static) -> Self {
        Self {
            core: self.core.with_progress(sink),
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

    /// Search with absolute coordinate `values`, tried in the given order.
    pub fn run(
        &mut self,
        values: &[f64],
        x_init: Option<Vec<f64>>,
    ) -> OptimResult<OptimizationOutcome> {
        if values.is_empty() {
            return Err(ConfigError::EmptyValues.into());
        }
        self.core.run_with(&mut CoordinatePass { values }, x_init)
    }
}

struct CoordinatePass<'v> {
    values: &'v [f64],
}

impl SearchPass for CoordinatePass<'_> {
    fn name(&self) -> &'static str {
        "coordinate"
    }

    fn step_label(&self) -> &'static str {
        "Iter"
    }

    fn steps_per_pass(&self, n_var: usize) -> usize {
        n_var
    }

    fn full_iteration<H: Hooks>(&mut self, run: &mut Run<'_, H>) -> OptimResult<()> {
        for index in 0..run.n_var() {
            let mut x = run.current_x().to_vec();
            let mut scan = run.scan();
            for &value in self.values {
                x[index] = run.constrain(value);
                let (cost, data) = run.evaluate(&x)?;
                scan.offer(&x, cost, data);
            }
            let best = scan.into_best().ok_or(ConfigError::EmptyValues)?;
            run.set_current_x(best.x.clone());
            run.commit_step(index, best)?;
        }
        run.reset_to_best();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::SumOfSquares;
    use crate::progress::{ChannelProgress, ProgressUpdate};
    use eo_types::{DataMap, Direction, OptimError};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sum_of_squares(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[derive(Default)]
    struct BestLog {
        costs: Vec<f64>,
        iter_costs: Vec<f64>,
        iter_data: Vec<DataMap>,
    }

    impl Hooks for BestLog {
        fn on_best(&mut self, _x: &[f64], cost: f64, _d: &DataMap) -> Value {
            self.costs.push(cost);
            json!({ "improvements": self.costs.len() })
        }

        fn after_iter(&mut self, _i: usize, cost: f64, _x: &[f64], data: &DataMap) -> Value {
            self.iter_costs.push(cost);
            self.iter_data.push(data.clone());
            json!({})
        }
    }

    #[test]
    fn minimizes_sum_of_squares() {
        let config = OptimizerConfig::new(2, Direction::Minimize);
        let mut search = CoordinateSearch::new(config).unwrap();
        search.register_cost_function(SumOfSquares);

        let outcome = search
            .run(&[-1.0, 0.0, 1.0], Some(vec![5.0, 5.0]))
            .unwrap();

        assert!(outcome.best_cost.abs() < 1e-12);
        assert_eq!(outcome.best_x, vec![0.0, 0.0]);
        // bootstrap + 2 coordinates x 3 values
        assert_eq!(outcome.evaluations, 7);
        assert_eq!(outcome.evolution, vec![25.0, 0.0]);
        assert_eq!(outcome.data["norm"], json!(0.0));
    }

    #[test]
    fn maximizes_negative_sum_of_squares() {
        let config = OptimizerConfig::new(2, Direction::Maximize);
        let mut search = CoordinateSearch::new(config).unwrap();
        search.register_callback(|x: &[f64]| Ok(Evaluation::new(-sum_of_squares(x))));

        let outcome = search
            .run(&[-1.0, 0.0, 1.0], Some(vec![5.0, 5.0]))
            .unwrap();

        assert!(outcome.best_cost.abs() < 1e-12);
        assert_eq!(outcome.best_x, vec![0.0, 0.0]);
    }

    #[test]
    fn ties_keep_first_scanned_value() {
        let config = OptimizerConfig::new(1, Direction::Minimize);
        let mut search = CoordinateSearch::new(config).unwrap();
        // -1 and 1 cost the same; -1 is scanned first.
        search.register_callback(|x: &[f64]| Ok(Evaluation::new(x[0] * x[0])));

        let outcome = search.run(&[-1.0, 1.0, 2.0], Some(vec![3.0])).unwrap();
        assert_eq!(outcome.best_x, vec![-1.0]);
        assert_eq!(outcome.best_cost, 1.0);
    }

    #[test]
    fn on_best_fires_once_per_improvement() {
        let config = OptimizerConfig::new(3, Direction::Minimize).with_repeat(2);
        let mut search = CoordinateSearch::new(config)
            .unwrap()
            .with_hooks(BestLog::default());
        search.register_cost_function(SumOfSquares);

        let outcome = search
            .run(&[2.0, 1.0, 0.0], Some(vec![3.0, 3.0, 3.0]))
            .unwrap();
        let log = search.into_hooks();

        // one improvement per coordinate in the first repeat, none in the second
        assert_eq!(log.costs, vec![18.0, 9.0, 0.0]);
        assert_eq!(outcome.data["improvements"], json!(3));
        for pair in log.costs.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        for pair in log.iter_costs.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(log.iter_costs.len(), 6);
    }

    #[test]
    fn step_best_reproduces_on_reevaluation() {
        fn f(x: &[f64]) -> f64 {
            (x[0] - 0.5).powi(2) + (x[1] + 0.25).powi(2) + x[0] * x[2]
        }

        let xs = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&xs);
        let config = OptimizerConfig::new(3, Direction::Minimize);
        let mut search = CoordinateSearch::new(config).unwrap();
        search.register_callback(move |x: &[f64]| {
            seen.borrow_mut().push(x.to_vec());
            Ok(Evaluation::new(f(x)))
        });

        let values = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let outcome = search.run(&values, Some(vec![1.0, 1.0, 1.0])).unwrap();

        let xs = xs.borrow();
        assert_eq!(xs.len(), 1 + 3 * values.len());
        let chunks: Vec<&[Vec<f64>]> = xs[1..].chunks(values.len()).collect();
        for (index, chunk) in chunks.iter().enumerate() {
            // first strict minimum of the scan is the committed candidate
            let mut scan_best = &chunk[0];
            for x in &chunk[1..] {
                if f(x) < f(scan_best) {
                    scan_best = x;
                }
            }
            assert_eq!(f(scan_best), outcome.evolution[index]);
            if let Some(next) = chunks.get(index + 1) {
                for (j, value) in scan_best.iter().enumerate() {
                    if j != index + 1 {
                        assert_eq!(next[0][j], *value);
                    }
                }
            }
        }
        assert_eq!(f(&outcome.best_x), outcome.best_cost);
    }

    #[test]
    fn on_best_silent_when_start_is_optimal() {
        let config = OptimizerConfig::new(2, Direction::Minimize).with_repeat(2);
        let mut search = CoordinateSearch::new(config)
            .unwrap()
            .with_hooks(BestLog::default());
        search.register_cost_function(SumOfSquares);

        let outcome = search
            .run(&[-2.0, -1.0, 1.0, 2.0], Some(vec![0.0, 0.0]))
            .unwrap();
        let log = search.into_hooks();

        assert!(log.costs.is_empty());
        assert!(!outcome.data.contains_key("improvements"));
        assert_eq!(outcome.best_x, vec![0.0, 0.0]);
        assert_eq!(outcome.best_cost, 0.0);
        // the second coordinate is scanned from the drifted [-1, 0]
        assert_eq!(outcome.evolution, vec![1.0, 2.0, 1.0, 2.0]);
        assert_eq!(log.iter_costs, vec![0.0; 4]);
    }

    #[test]
    fn after_iter_sees_best_record_data() {
        let config = OptimizerConfig::new(2, Direction::Minimize);
        let mut search = CoordinateSearch::new(config)
            .unwrap()
            .with_hooks(BestLog::default());
        search.register_cost_function(SumOfSquares);

        search.run(&[-1.0, 0.0, 1.0], Some(vec![2.0, 2.0])).unwrap();
        let log = search.into_hooks();

        assert_eq!(log.iter_data.len(), 2);
        for data in &log.iter_data {
            assert!(data.contains_key("norm"));
            // hook keys overlay the best record's keys
            assert!(data.contains_key("improvements"));
        }
        assert_eq!(log.iter_data[1]["norm"], json!(0.0));
    }

    #[test]
    fn value_constraint_is_applied_before_evaluation() {
        struct Quantized;
        impl Hooks for Quantized {
            fn value_constraint(&self, value: f64) -> f64 {
                value.round().clamp(-2.0, 2.0)
            }
        }

        let xs = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&xs);
        let config = OptimizerConfig::new(1, Direction::Minimize);
        let mut search = CoordinateSearch::new(config).unwrap().with_hooks(Quantized);
        search.register_callback(move |x: &[f64]| {
            seen.borrow_mut().push(x[0]);
            Ok(Evaluation::new((x[0] - 1.0).abs()))
        });

        let outcome = search.run(&[-7.3, 0.6, 9.0], Some(vec![0.0])).unwrap();
        assert_eq!(*xs.borrow(), vec![0.0, -2.0, 1.0, 2.0]);
        assert_eq!(outcome.best_x, vec![1.0]);
    }

    #[test]
    fn repeats_restart_from_all_time_best() {
        let config = OptimizerConfig::new(1, Direction::Minimize).with_repeat(3);
        let mut search = CoordinateSearch::new(config).unwrap();
        search.register_callback(|x: &[f64]| Ok(Evaluation::new((x[0] - 2.0).abs())));

        // Every value is worse than the start, so all-time best stays at x_init.
        let outcome = search.run(&[10.0, -10.0], Some(vec![2.0])).unwrap();
        assert_eq!(outcome.best_x, vec![2.0]);
        assert_eq!(outcome.best_cost, 0.0);
        assert_eq!(outcome.evaluations, 1 + 3 * 2);
    }

    #[test]
    fn empty_values_rejected() {
        let config = OptimizerConfig::new(2, Direction::Minimize);
        let mut search = CoordinateSearch::new(config).unwrap();
        search.register_cost_function(SumOfSquares);
        let err = search.run(&[], None).unwrap_err();
        assert!(matches!(err, OptimError::Config(ConfigError::EmptyValues)));
    }

    #[test]
    fn progress_reports_every_coordinate() {
        let (tx, rx) = crossbeam_channel::unbounded::<ProgressUpdate>();
        let config = OptimizerConfig::new(2, Direction::Minimize).with_repeat(2);
        let mut search = CoordinateSearch::new(config)
            .unwrap()
            .with_progress(ChannelProgress::new(tx));
        search.register_cost_function(SumOfSquares);
        search.run(&[0.0, 1.0], Some(vec![1.0, 1.0])).unwrap();

        let descriptions: Vec<String> = rx.try_iter().map(|u| u.description()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Repeat: 1/2 | Iter: 1/2 | Cost = 1.0000",
                "Repeat: 1/2 | Iter: 2/2 | Cost = 0.0000",
                "Repeat: 2/2 | Iter: 1/2 | Cost = 0.0000",
                "Repeat: 2/2 | Iter: 2/2 | Cost = 0.0000",
            ]
        );
    }
}
