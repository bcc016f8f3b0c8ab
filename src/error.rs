//! Error types for the annealing engine.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AmosaError>;

/// Failure reported by a problem's evaluation function.
///
/// The engine never retries an evaluation; the error is handed back to the
/// caller wrapped in [`AmosaError::Evaluation`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("evaluation failed: {message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors produced by configuration, the annealing state machine and
/// checkpoint handling.
#[derive(Error, Debug)]
pub enum AmosaError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Initialization was attempted without a mutation operator.
    #[error("no mutation operator set, supply one with `with_mutation`")]
    MissingMutation,

    /// An initialization-only parameter was changed after initialization.
    #[error("`{0}` can only be set before initialization")]
    AlreadyInitialized(&'static str),

    /// The operation requires an initialized algorithm.
    #[error("algorithm not initialized")]
    NotInitialized,

    /// `step()` was called after the run terminated.
    #[error("algorithm already terminated")]
    Terminated,

    /// The problem failed to evaluate a decision vector.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// An evaluation returned the wrong number of objectives.
    #[error("expected {expected} objectives, evaluation returned {actual}")]
    ObjectiveCount { expected: usize, actual: usize },

    /// An evaluation returned NaN or an infinite value.
    #[error("evaluation returned non-finite {kind} {index}: {value}")]
    NonFinite {
        kind: &'static str,
        index: usize,
        value: f64,
    },

    /// A checkpoint decoded fine but does not describe a usable state.
    #[error("incompatible checkpoint: {0}")]
    Checkpoint(String),

    /// A checkpoint could not be encoded or decoded.
    #[error("checkpoint codec error: {0}")]
    Json(#[source] serde_json::Error),

    /// Checkpoint transport failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AmosaError {
    /// Transport failures surfaced by the JSON reader or writer become
    /// [`AmosaError::Io`]; everything else is a codec error.
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Json(err)
        }
    }
}

impl AmosaError {
    /// Whether the error is a usage or configuration mistake, as opposed to
    /// a failure the caller may recover from by retrying or starting fresh.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::MissingMutation
                | Self::AlreadyInitialized(_)
                | Self::NotInitialized
                | Self::Terminated
        )
    }
}
