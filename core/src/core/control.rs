// sluice/src/core/control.rs

//! Lifecycle of a pipeline: built, then run exactly once.

use std::fmt;

/// Where a pipeline is in its one-shot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  /// Accepting steps. `pipe*`, `run` and `end` are allowed.
  Building,
  /// A run has started and not yet reported. The step sequence is frozen.
  Running,
  /// The run reported its outcome. Nothing further is accepted.
  Finished,
}

impl RunState {
  pub fn accepts_steps(self) -> bool {
    self == RunState::Building
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      RunState::Building => "building",
      RunState::Running => "running",
      RunState::Finished => "finished",
    };
    f.write_str(label)
  }
}
