use thiserror::Error;

/// Error type returned by a cost callback.
///
/// The engine never inspects it; it is handed back to the caller unchanged
/// inside [`OptimError::Callback`].
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the EasyOptim system
#[derive(Error, Debug)]
pub enum OptimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("Cost callback failed: {0}")]
    Callback(#[source] CallbackError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invalid construction or run parameters.
///
/// Always raised before the first cost evaluation of a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("n_var must be at least 1")]
    ZeroDimension,

    #[error("n_repeat must be at least 1")]
    ZeroRepeat,

    #[error("candidate value set is empty")]
    EmptyValues,

    #[error("values and fractions differ in length: {values} values, {fractions} fractions")]
    LengthMismatch { values: usize, fractions: usize },

    #[error("fraction #{index} is {fraction}, expected a value in [0, 1]")]
    FractionOutOfRange { index: usize, fraction: f64 },

    #[error("initial vector has {actual} elements, expected {expected}")]
    InitialVectorLength { expected: usize, actual: usize },

    #[error("no cost callback registered")]
    MissingCallback,

    #[error("{message}")]
    Invalid { message: String },
}

/// A hook or the cost callback returned a value of the wrong shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("hook `{hook}` should return a mapping and nothing else, got {found}")]
    HookReturn { hook: &'static str, found: &'static str },

    #[error("cost callback data should be a mapping, got {found}")]
    CallbackData { found: &'static str },

    #[error("cost callback returned NaN")]
    NanCost,
}

/// Result type alias for EasyOptim operations
pub type OptimResult<T> = Result<T, OptimError>;

impl OptimError {
    /// Wrap any error raised by a cost callback.
    pub fn callback<E>(error: E) -> Self
    where
        E: Into<CallbackError>,
    {
        OptimError::Callback(error.into())
    }
}

/// Macro for creating free-form configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::ConfigError::Invalid { message: format!($($arg)*) }
    };
}
