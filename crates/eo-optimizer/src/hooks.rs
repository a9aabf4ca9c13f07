//! Lifecycle hooks.
//!
//! Every hook returns a JSON value that must be a mapping. The engine merges
//! it into the run's aggregated data (returned keys overwrite existing ones);
//! any other shape aborts the run with a [`ContractViolation`] naming the hook.

use eo_types::{json_kind, merge_overwrite, ContractViolation, DataMap};
use serde_json::{Map, Value};

/// The empty mapping every default hook returns.
pub fn no_data() -> Value {
    Value::Object(Map::new())
}

/// Callbacks invoked by the engine at fixed points of a run.
///
/// All methods have no-op defaults, so implementors override only what they
/// need.
pub trait Hooks {
    /// Called once at the beginning of a run.
    fn begin(&mut self) -> Value {
        no_data()
    }

    /// Called once at the very end of a run.
    fn end(&mut self) -> Value {
        no_data()
    }

    /// Called before each full iteration (repeat).
    fn before_full_iter(&mut self) -> Value {
        no_data()
    }

    /// Called after each full iteration with the all-time best so far.
    fn after_full_iter(
        &mut self,
        _i_full_iter: usize,
        _best_cost: f64,
        _best_x: &[f64],
        _data: &DataMap,
    ) -> Value {
        no_data()
    }

    /// Called each time a new all-time best is found.
    fn on_best(&mut self, _best_x: &[f64], _best_cost: f64, _best_data: &DataMap) -> Value {
        no_data()
    }

    /// Called after each inner step (one coordinate, or one partition draw).
    fn after_iter(
        &mut self,
        _iter_index: usize,
        _best_cost: f64,
        _best_x: &[f64],
        _data: &DataMap,
    ) -> Value {
        no_data()
    }

    /// Projection applied to every coordinate value before evaluation.
    fn value_constraint(&self, value: f64) -> f64 {
        value
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl Hooks for NoHooks {}

impl<H: Hooks + ?Sized> Hooks for Box<H> {
    fn begin(&mut self) -> Value {
        (**self).begin()
    }

    fn end(&mut self) -> Value {
        (**self).end()
    }

    fn before_full_iter(&mut self) -> Value {
        (**self).before_full_iter()
    }

    fn after_full_iter(
        &mut self,
        i_full_iter: usize,
        best_cost: f64,
        best_x: &[f64],
        data: &DataMap,
    ) -> Value {
        (**self).after_full_iter(i_full_iter, best_cost, best_x, data)
    }

    fn on_best(&mut self, best_x: &[f64], best_cost: f64, best_data: &DataMap) -> Value {
        (**self).on_best(best_x, best_cost, best_data)
    }

    fn after_iter(
        &mut self,
        iter_index: usize,
        best_cost: f64,
        best_x: &[f64],
        data: &DataMap,
    ) -> Value {
        (**self).after_iter(iter_index, best_cost, best_x, data)
    }

    fn value_constraint(&self, value: f64) -> f64 {
        (**self).value_constraint(value)
    }
}

/// Validate a hook's return value and merge it into `data`.
pub(crate) fn absorb(
    hook: &'static str,
    returned: Value,
    data: &mut DataMap,
) -> Result<(), ContractViolation> {
    match returned {
        Value::Object(map) => {
            merge_overwrite(data, map);
            Ok(())
        }
        other => Err(ContractViolation::HookReturn {
            hook,
            found: json_kind(&other),
        }),
    }
}
