//! Evaluation results and best-so-far records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ContractViolation;

/// Auxiliary data attached to evaluations and accumulated by hooks.
pub type DataMap = Map<String, Value>;

/// What a cost callback returns for one candidate vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub cost: f64,
    /// Arbitrary measurements. Must be a JSON object.
    pub data: Value,
}

impl Evaluation {
    /// An evaluation carrying no auxiliary data.
    pub fn new(cost: f64) -> Self {
        Self {
            cost,
            data: Value::Object(Map::new()),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.data {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Check the callback contract and split into cost and data map.
    pub fn into_checked(self) -> Result<(f64, DataMap), ContractViolation> {
        if self.cost.is_nan() {
            return Err(ContractViolation::NanCost);
        }
        match self.data {
            Value::Object(map) => Ok((self.cost, map)),
            other => Err(ContractViolation::CallbackData {
                found: json_kind(&other),
            }),
        }
    }
}

/// A candidate vector together with its evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    pub x: Vec<f64>,
    pub cost: f64,
    pub data: DataMap,
}

impl BestRecord {
    pub fn new(x: Vec<f64>, cost: f64, data: DataMap) -> Self {
        Self { x, cost, data }
    }
}

/// Human-readable name of a JSON value's kind, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

/// Merge `incoming` into `target`, replacing keys that already exist.
pub fn merge_overwrite(target: &mut DataMap, incoming: DataMap) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}

/// Merge `incoming` into `target`, keeping keys that already exist.
pub fn merge_missing(target: &mut DataMap, incoming: &DataMap) {
    for (key, value) in incoming {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}
