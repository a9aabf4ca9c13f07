use std::str::FromStr;

use eo_optimizer::{
    config_error, ConfigError, CoordinateSearch, DataMap, Direction, Evaluation, Hooks,
    OptimizationOutcome, OptimizerConfig, PartitionSearch, TracingProgress,
};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logs every improvement and counts them in the returned data.
#[derive(Default)]
struct ImprovementLog {
    improvements: usize,
}

impl Hooks for ImprovementLog {
    fn on_best(&mut self, _best_x: &[f64], best_cost: f64, _best_data: &DataMap) -> Value {
        self.improvements += 1;
        info!("Improvement #{}: cost {:.6}", self.improvements, best_cost);
        json!({ "improvements": self.improvements })
    }

    fn value_constraint(&self, value: f64) -> f64 {
        value.clamp(-PHASE_LIMIT, PHASE_LIMIT)
    }
}

const PHASE_LIMIT: f64 = std::f64::consts::PI;

/// Synthetic calibration target: recover a hidden phase pattern.
fn target(n_var: usize) -> Vec<f64> {
    (0..n_var)
        .map(|i| ((i as f64 * 0.7).sin() * 2.0).round() / 2.0)
        .collect()
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| config_error!("{} has an unparsable value {:?}", name, raw))
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => parse_env(name, &raw),
        Err(_) => Ok(default),
    }
}

fn load_config() -> anyhow::Result<OptimizerConfig> {
    if let Ok(path) = std::env::var("EASYOPT_CONFIG") {
        let text = std::fs::read_to_string(&path)?;
        return Ok(OptimizerConfig::from_json(&text)?);
    }

    let n_var: usize = env_or("EASYOPT_N_VAR", 16)?;
    let n_repeat: usize = env_or("EASYOPT_REPEAT", 2)?;
    let mut config = OptimizerConfig::new(n_var, Direction::Minimize).with_repeat(n_repeat);
    if let Ok(seed) = std::env::var("EASYOPT_SEED") {
        config = config.with_seed(parse_env("EASYOPT_SEED", &seed)?);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let strategy =
        std::env::var("EASYOPT_STRATEGY").unwrap_or_else(|_| "coordinate".to_string());
    let goal = target(config.n_var);
    let cost = move |x: &[f64]| -> Result<Evaluation, eo_optimizer::CallbackError> {
        let error: f64 = x.iter().zip(&goal).map(|(a, b)| (a - b).powi(2)).sum();
        Ok(Evaluation::new(error).with_data("rms", (error / x.len() as f64).sqrt()))
    };

    let outcome: OptimizationOutcome = match strategy.as_str() {
        "coordinate" => {
            let mut search = CoordinateSearch::new(config)?
                .with_hooks(ImprovementLog::default())
                .with_progress(TracingProgress::default());
            search.register_callback(cost);
            search.run(&[-1.0, -0.5, 0.0, 0.5, 1.0], None)?
        }
        "partition" => {
            let mut search = PartitionSearch::new(config)?
                .with_hooks(ImprovementLog::default())
                .with_progress(TracingProgress::default());
            search.register_callback(cost);
            search.run(&[0.5, -0.5, 0.25, -0.25], &[0.5, 0.25, 0.125, 0.0625], None)?
        }
        other => {
            return Err(config_error!(
                "unknown strategy {:?}, expected coordinate or partition",
                other
            )
            .into());
        }
    };

    info!(
        "Run {} finished in {} ms",
        outcome.run_id,
        outcome.duration().num_milliseconds()
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
