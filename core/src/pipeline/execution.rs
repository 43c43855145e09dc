// sluice/src/pipeline/execution.rs

//! Contains `Pipeline::run()` and `Pipeline::end()`, which hand the accumulated steps to
//! the pipeline's sequencer exactly once.

use std::sync::Arc;

use tracing::{event, instrument, Level};

use crate::core::control::RunState;
use crate::core::step::AdaptedStep;
use crate::error::{SluiceError, SluiceResult};
use crate::pipeline::definition::Pipeline;

impl<V, Err> Pipeline<V, Err>
where
  V: Send + 'static,
  Err: std::error::Error + From<SluiceError> + Send + Sync + 'static,
{
  /// Moves the pipeline into `Running` and takes its seed and steps.
  fn begin(&mut self) -> SluiceResult<(V, Vec<AdaptedStep<V, Err>>)> {
    // The seed is present exactly while the pipeline is `Building`.
    let Some(seed) = self.seed.take().filter(|_| self.state == RunState::Building) else {
      event!(Level::WARN, pipeline = %self.name, state = %self.state, "Rejected run: pipeline already run.");
      return Err(SluiceError::AlreadyRun {
        pipeline: self.name.clone(),
        state: self.state,
      });
    };
    self.state = RunState::Running;
    Ok((seed, std::mem::take(&mut self.steps)))
  }

  async fn drive(&mut self, seed: V, steps: Vec<AdaptedStep<V, Err>>) -> Result<V, Err> {
    event!(Level::DEBUG, num_steps = steps.len(), "Pipeline execution starting.");
    let sequencer = Arc::clone(&self.sequencer);
    let outcome = sequencer.execute(seed, steps).await;
    self.state = RunState::Finished;

    match &outcome {
      Ok(_) => event!(Level::DEBUG, "Pipeline execution completed successfully."),
      Err(e) => event!(Level::DEBUG, error = %e, "Pipeline execution halted by a failing step."),
    }
    outcome
  }

  /// Runs every step in order, feeding the seed to the first one, and returns the last
  /// step's result (the seed itself if there are no steps).
  ///
  /// The first step error ends the run and is returned as is. A pipeline runs at most
  /// once: calling `run` (or `end`) again returns `SluiceError::AlreadyRun`, converted into
  /// `Err`, without invoking any step.
  ///
  /// There is no timeout. A step whose future never resolves stalls the run.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline = %self.name,
      value_type = %std::any::type_name::<V>(),
      pipeline_error_type = %std::any::type_name::<Err>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&mut self) -> Result<V, Err> {
    let (seed, steps) = self.begin().map_err(Err::from)?;
    self.drive(seed, steps).await
  }

  /// Callback flavour of [`run`](Self::run): the outcome goes to `completion`, which is
  /// called exactly once.
  ///
  /// Guard failures are returned instead and `completion` is not called:
  /// `SluiceError::MissingCompletion` when `completion` is `None` (the pipeline is left
  /// untouched and can still be run), `SluiceError::AlreadyRun` on a second run.
  #[instrument(
    name = "Pipeline::end",
    skip_all,
    fields(
      pipeline = %self.name,
      value_type = %std::any::type_name::<V>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn end<C>(&mut self, completion: Option<C>) -> SluiceResult<()>
  where
    C: FnOnce(Result<V, Err>) + Send,
  {
    let Some(completion) = completion else {
      event!(Level::ERROR, "Pipeline ended without a completion callback.");
      return Err(SluiceError::MissingCompletion {
        pipeline: self.name.clone(),
      });
    };
    let (seed, steps) = self.begin()?;
    let outcome = self.drive(seed, steps).await;
    completion(outcome);
    Ok(())
  }
}
