// sluice/src/core/sequencer.rs

//! Defines the `Sequencer<V, Err>` seam used by `Pipeline::run` and the default
//! `Waterfall` implementation.

use async_trait::async_trait;
use tracing::{event, instrument, span, Instrument, Level};

use crate::core::step::AdaptedStep;

/// Runs an ordered list of adapted steps.
///
/// Implementations must invoke the steps strictly in order, feed each successful result
/// into the next step, stop at the first error and return it untouched. With no steps the
/// seed is returned as is. Any implementation honouring that contract can be plugged into
/// a pipeline with `Pipeline::with_sequencer`.
#[async_trait]
pub trait Sequencer<V, Err>: Send + Sync
where
  V: Send + 'static,
  Err: Send + 'static,
{
  async fn execute(&self, seed: V, steps: Vec<AdaptedStep<V, Err>>) -> Result<V, Err>;
}

/// The default sequencer: an async fold over the steps that short-circuits on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Waterfall;

#[async_trait]
impl<V, Err> Sequencer<V, Err> for Waterfall
where
  V: Send + 'static,
  Err: std::error::Error + Send + 'static,
{
  #[instrument(name = "Waterfall::execute", skip_all, fields(num_steps = steps.len()))]
  async fn execute(&self, seed: V, steps: Vec<AdaptedStep<V, Err>>) -> Result<V, Err> {
    let mut current = seed;

    for (step_idx, step) in steps.into_iter().enumerate() {
      let step_span = span!(Level::DEBUG, "waterfall_step", step_index = step_idx, step = step.label());
      let label = step.label();

      // The user function's synchronous body runs inside the step span as well as its future.
      let step_fut = step_span.in_scope(|| step.invoke(current));
      current = match step_fut.instrument(step_span).await {
        Ok(next) => next,
        Err(e) => {
          event!(Level::ERROR, step_index = step_idx, step = label, error = %e, "Step failed; halting.");
          return Err(e);
        }
      };
      event!(Level::TRACE, step_index = step_idx, step = label, "Step completed.");
    }

    Ok(current)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::step::{adapt, adapt_callback, Done};
  use crate::error::SluiceError;
  use parking_lot::Mutex;
  use std::sync::Arc;

  fn current_span_name() -> Option<&'static str> {
    tracing::Span::current().metadata().map(|m| m.name())
  }

  #[tokio::test]
  async fn step_bodies_run_inside_the_step_span() {
    let subscriber = tracing_subscriber::fmt()
      .with_max_level(Level::TRACE)
      .with_test_writer()
      .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let seen: Arc<Mutex<Vec<Option<&'static str>>>> = Arc::new(Mutex::new(Vec::new()));

    let sync_seen = seen.clone();
    let async_step = adapt::<i32, SluiceError, _, _, _, SluiceError>(
      Some(move |(), prev: i32| {
        sync_seen.lock().push(current_span_name());
        async move { Ok::<_, SluiceError>(prev + 1) }
      }),
      (),
    );
    let callback_seen = seen.clone();
    let callback_step = adapt_callback::<i32, SluiceError, _, _, SluiceError>(
      Some(move |(), prev: i32, done: Done<i32, SluiceError>| {
        callback_seen.lock().push(current_span_name());
        done.ok(prev + 1);
      }),
      (),
    );

    let steps: Vec<AdaptedStep<i32, SluiceError>> = async_step.into_iter().chain(callback_step).collect();
    let result = Waterfall.execute(0, steps).await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(*seen.lock(), vec![Some("waterfall_step"), Some("waterfall_step")]);
  }
}
