//! Cost callback interface.

use eo_types::{CallbackError, Evaluation};

/// A black-box cost function.
///
/// Called strictly sequentially by the engine, once per candidate vector. An
/// `Err` aborts the run and is returned to the caller untouched.
pub trait CostFunction {
    fn evaluate(&mut self, x: &[f64]) -> Result<Evaluation, CallbackError>;
}

impl<F> CostFunction for F
where
    F: FnMut(&[f64]) -> Result<Evaluation, CallbackError>,
{
    fn evaluate(&mut self, x: &[f64]) -> Result<Evaluation, CallbackError> {
        self(x)
    }
}

/// Sum of squared coordinates. Handy as a smoke-test objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumOfSquares;

impl CostFunction for SumOfSquares {
    fn evaluate(&mut self, x: &[f64]) -> Result<Evaluation, CallbackError> {
        let cost = x.iter().map(|v| v * v).sum::<f64>();
        Ok(Evaluation::new(cost).with_data("norm", cost.sqrt()))
    }
}
