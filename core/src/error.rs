// sluice/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::core::control::RunState;

#[derive(Debug, Error)]
pub enum SluiceError {
  /// `pipe*`, `run` or `end` was called on a pipeline that is running or has already run.
  #[error("Pipeline '{pipeline}' has already been run (state: {state})")]
  AlreadyRun { pipeline: String, state: RunState },

  /// `end` was called without a completion to report the outcome through.
  #[error("Pipeline '{pipeline}' was ended without a completion callback")]
  MissingCompletion { pipeline: String },

  /// A callback-style step dropped its `Done` handle without reporting a result.
  #[error("Step '{step}' dropped its completion handle without reporting a result")]
  StepAbandoned { step: String },

  #[error("Error in user-provided step. Source: {source}")]
  Step {
    #[source]
    source: AnyhowError,
  },
}

impl SluiceError {
  /// True for the guard errors raised by the pipeline itself rather than by a step.
  pub fn is_guard(&self) -> bool {
    matches!(self, SluiceError::AlreadyRun { .. } | SluiceError::MissingCompletion { .. })
  }
}

impl From<AnyhowError> for SluiceError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a SluiceError that travelled through anyhow instead of nesting it.
    match err.downcast::<SluiceError>() {
      Ok(inner) => inner,
      Err(source) => SluiceError::Step { source },
    }
  }
}

pub type SluiceResult<T, E = SluiceError> = std::result::Result<T, E>;
