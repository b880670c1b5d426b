//! Error types for model construction.

use thiserror::Error;

/// Errors raised while building a physical model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ms_core::CoreError),
}

pub type ModelResult<T> = Result<T, ModelError>;
