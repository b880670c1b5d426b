//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during adaptive integration.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("State dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Evaluation time {t} outside integrated span [{start}, {end}]")]
    EvaluationOutOfRange { t: f64, start: f64, end: f64 },

    #[error("Step size underflow at t = {t}: h = {h:e} below floor {h_min:e} (state = {state:?})")]
    StepSizeUnderflow {
        t: f64,
        h: f64,
        h_min: f64,
        state: Vec<f64>,
    },

    #[error("Step budget of {max_steps} attempts exceeded at t = {t}")]
    StepBudgetExceeded { max_steps: usize, t: f64 },

    #[error("Non-finite state at t = {t}: {state:?}")]
    NonFiniteState { t: f64, state: Vec<f64> },

    #[error("Model error: {0}")]
    Model(#[from] ms_model::ModelError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// True for failures of the stepping loop itself (as opposed to bad input).
    pub fn is_integration_failure(&self) -> bool {
        matches!(
            self,
            SimError::StepSizeUnderflow { .. }
                | SimError::StepBudgetExceeded { .. }
                | SimError::NonFiniteState { .. }
        )
    }
}
