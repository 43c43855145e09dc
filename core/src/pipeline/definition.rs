// sluice/src/pipeline/definition.rs

//! Contains the `Pipeline<V, Err>` struct definition and the methods for its
//! construction and chaining.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{event, Level};

use crate::core::control::RunState;
use crate::core::seed::{make_seed, Aggregate};
use crate::core::sequencer::{Sequencer, Waterfall};
use crate::core::step::{adapt, adapt_callback, AdaptedStep, Done};
use crate::error::{SluiceError, SluiceResult};

const DEFAULT_NAME: &str = "pipeline";

/// A linear, run-once pipeline over values of type `V`.
///
/// Steps are appended in place and run strictly in the order they were added, each one
/// receiving the previous step's result. The first step receives the seed.
///
/// `Err` is the error type the run reports. Step errors are converted into it with
/// `Into` and otherwise passed through untouched; the pipeline's own guard errors
/// (`SluiceError::AlreadyRun`) reach it through `From<SluiceError>`.
pub struct Pipeline<V, Err>
where
  V: Send + 'static,
  Err: std::error::Error + From<SluiceError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  /// Taken by the run. `None` afterwards.
  pub(crate) seed: Option<V>,
  /// Adapted steps in insertion order. Only ever appended to while `Building`.
  pub(crate) steps: Vec<AdaptedStep<V, Err>>,
  pub(crate) state: RunState,
  pub(crate) sequencer: Arc<dyn Sequencer<V, Err>>,
}

impl<V, Err> Pipeline<V, Err>
where
  V: Send + 'static,
  Err: std::error::Error + From<SluiceError> + Send + Sync + 'static,
{
  /// Creates an empty pipeline seeded with `seed`, verbatim.
  pub fn new(seed: V) -> Self {
    Self {
      name: DEFAULT_NAME.to_string(),
      seed: Some(seed),
      steps: Vec::new(),
      state: RunState::Building,
      sequencer: Arc::new(Waterfall),
    }
  }

  /// Creates an empty pipeline whose seed is built from `values` by [`make_seed`]:
  /// nothing gives an empty aggregate, one value is used as is, several are shallow-merged
  /// left to right.
  pub fn from_seeds(values: impl IntoIterator<Item = V>) -> Self
  where
    V: Aggregate,
  {
    Self::new(make_seed(values))
  }

  /// Creates an empty pipeline seeded with an empty aggregate.
  pub fn empty() -> Self
  where
    V: Aggregate,
  {
    Self::from_seeds(std::iter::empty())
  }

  /// Creates a pipeline seeded with an empty aggregate whose first step is `step_fn`
  /// bound to `bound`.
  pub fn starting_with<A, F, Fut, UserErr>(step_fn: F, bound: A) -> Self
  where
    V: Aggregate,
    A: Send + 'static,
    F: FnOnce(A, V) -> Fut + Send + 'static,
    Fut: Future<Output = Result<V, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + 'static,
  {
    let mut pipeline = Self::empty();
    pipeline.steps.extend(adapt(Some(step_fn), bound));
    pipeline
  }

  /// Sets the label used in tracing spans and error messages.
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Replaces the default [`Waterfall`] sequencer.
  pub fn with_sequencer(mut self, sequencer: impl Sequencer<V, Err> + 'static) -> Self {
    self.sequencer = Arc::new(sequencer);
    self
  }

  fn ensure_accepts_steps(&self) -> SluiceResult<()> {
    if self.state.accepts_steps() {
      return Ok(());
    }
    event!(Level::WARN, pipeline = %self.name, state = %self.state, "Rejected step: pipeline already run.");
    Err(SluiceError::AlreadyRun {
      pipeline: self.name.clone(),
      state: self.state,
    })
  }

  fn push_adapted(&mut self, adapted: Option<AdaptedStep<V, Err>>) -> SluiceResult<&mut Self> {
    self.ensure_accepts_steps()?;
    match adapted {
      Some(step) => {
        event!(Level::DEBUG, pipeline = %self.name, step = step.label(), step_index = self.steps.len(), "Step appended.");
        self.steps.push(step);
      }
      None => {
        event!(Level::TRACE, pipeline = %self.name, "No step given; nothing appended.");
      }
    }
    Ok(self)
  }

  // --- Chaining ---

  /// Appends `step_fn`, bound to `bound`, and returns the same pipeline for chaining.
  ///
  /// At run time the step is called as `step_fn(bound, previous)`.
  pub fn pipe<A, F, Fut, UserErr>(&mut self, step_fn: F, bound: A) -> SluiceResult<&mut Self>
  where
    A: Send + 'static,
    F: FnOnce(A, V) -> Fut + Send + 'static,
    Fut: Future<Output = Result<V, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + 'static,
  {
    self.pipe_opt(Some(step_fn), bound)
  }

  /// Like [`pipe`](Self::pipe), but `None` is accepted and appends nothing.
  pub fn pipe_opt<A, F, Fut, UserErr>(&mut self, step_fn: Option<F>, bound: A) -> SluiceResult<&mut Self>
  where
    A: Send + 'static,
    F: FnOnce(A, V) -> Fut + Send + 'static,
    Fut: Future<Output = Result<V, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + 'static,
  {
    self.push_adapted(adapt(step_fn, bound))
  }

  /// Appends a step that takes no bound argument.
  pub fn then<F, Fut, UserErr>(&mut self, step_fn: F) -> SluiceResult<&mut Self>
  where
    F: FnOnce(V) -> Fut + Send + 'static,
    Fut: Future<Output = Result<V, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + 'static,
  {
    self.pipe(move |(), previous| step_fn(previous), ())
  }

  /// Appends a callback-style step, called as `step_fn(bound, previous, done)`.
  pub fn pipe_callback<A, F, UserErr>(&mut self, step_fn: F, bound: A) -> SluiceResult<&mut Self>
  where
    A: Send + 'static,
    F: FnOnce(A, V, Done<V, UserErr>) + Send + 'static,
    UserErr: Into<Err> + Send + 'static,
  {
    self.pipe_callback_opt(Some(step_fn), bound)
  }

  pub fn pipe_callback_opt<A, F, UserErr>(&mut self, step_fn: Option<F>, bound: A) -> SluiceResult<&mut Self>
  where
    A: Send + 'static,
    F: FnOnce(A, V, Done<V, UserErr>) + Send + 'static,
    UserErr: Into<Err> + Send + 'static,
  {
    self.push_adapted(adapt_callback(step_fn, bound))
  }

  // --- Introspection ---

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn state(&self) -> RunState {
    self.state
  }

  /// Number of steps waiting to run. Zero once the run has taken them.
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn step_labels(&self) -> Vec<&'static str> {
    self.steps.iter().map(AdaptedStep::label).collect()
  }
}

impl<V, Err> Default for Pipeline<V, Err>
where
  V: Aggregate + Send + 'static,
  Err: std::error::Error + From<SluiceError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::empty()
  }
}

impl<V, Err> fmt::Debug for Pipeline<V, Err>
where
  V: Send + 'static,
  Err: std::error::Error + From<SluiceError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("name", &self.name)
      .field("state", &self.state)
      .field("seed_present", &self.seed.is_some())
      .field("steps", &self.steps)
      .finish()
  }
}
