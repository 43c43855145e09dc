// sluice/src/core/step.rs

//! The step adapter: binds a user step function to its fixed argument and reshapes it
//! into the single-input form the sequencer drives.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;
use tracing::{event, Level};

use crate::error::SluiceError;

/// The future an adapted step resolves to: the value handed to the next step, or the
/// error that ends the run.
pub type StepFuture<V, Err> = Pin<Box<dyn Future<Output = Result<V, Err>> + Send>>;

type StepCall<V, Err> = Box<dyn FnOnce(V) -> StepFuture<V, Err> + Send>;

/// A step reshaped to the executor's calling convention: `previous -> Result<next, Err>`.
///
/// The wrapped call is `FnOnce`, so an adapted step can invoke its user function at most
/// once. Invoking it consumes the step.
pub struct AdaptedStep<V, Err> {
  label: &'static str,
  call: StepCall<V, Err>,
}

impl<V, Err> AdaptedStep<V, Err> {
  /// Type name of the user function this step wraps. Used in spans and error messages.
  pub fn label(&self) -> &'static str {
    self.label
  }

  /// Calls the user function with the bound argument and `previous`.
  ///
  /// The user function runs synchronously inside this call; only the future it returns
  /// is deferred. A panic in the user function is not caught.
  pub fn invoke(self, previous: V) -> StepFuture<V, Err> {
    (self.call)(previous)
  }
}

impl<V, Err> fmt::Debug for AdaptedStep<V, Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdaptedStep").field("label", &self.label).finish_non_exhaustive()
  }
}

/// Binds `step_fn` to `bound` and returns the adapted step.
///
/// `None` means "no step" and yields `None`; the pipeline drops it instead of appending.
/// Errors the user function reports are converted with `Into`, never wrapped.
pub fn adapt<V, Err, A, F, Fut, UserErr>(step_fn: Option<F>, bound: A) -> Option<AdaptedStep<V, Err>>
where
  V: Send + 'static,
  Err: Send + 'static,
  A: Send + 'static,
  F: FnOnce(A, V) -> Fut + Send + 'static,
  Fut: Future<Output = Result<V, UserErr>> + Send + 'static,
  UserErr: Into<Err> + Send + 'static,
{
  let step_fn = step_fn?;
  let call: StepCall<V, Err> = Box::new(move |previous| {
    let user_fut = step_fn(bound, previous);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  });
  Some(AdaptedStep {
    label: std::any::type_name::<F>(),
    call,
  })
}

/// Single-use completion handle given to callback-style steps.
///
/// Every reporting method consumes the handle, so a step can report at most once.
/// Dropping it without reporting ends the run with `SluiceError::StepAbandoned`.
pub struct Done<V, E> {
  tx: oneshot::Sender<Result<V, E>>,
}

impl<V, E> Done<V, E> {
  /// Reports the step's outcome.
  pub fn send(self, result: Result<V, E>) {
    // The receiver is gone only if the run itself was dropped; nobody is left to tell.
    let _ = self.tx.send(result);
  }

  pub fn ok(self, value: V) {
    self.send(Ok(value));
  }

  pub fn fail(self, error: E) {
    self.send(Err(error));
  }
}

impl<V, E> fmt::Debug for Done<V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Done").field("closed", &self.tx.is_closed()).finish()
  }
}

/// Callback-style counterpart of [`adapt`]: `step_fn(bound, previous, done)`.
///
/// The user function may report through `done` before returning, or hand `done` to
/// something that reports later. A step that keeps `done` alive and never reports stalls
/// the pipeline; there is no timeout.
pub fn adapt_callback<V, Err, A, F, UserErr>(step_fn: Option<F>, bound: A) -> Option<AdaptedStep<V, Err>>
where
  V: Send + 'static,
  Err: From<SluiceError> + Send + 'static,
  A: Send + 'static,
  F: FnOnce(A, V, Done<V, UserErr>) + Send + 'static,
  UserErr: Into<Err> + Send + 'static,
{
  let step_fn = step_fn?;
  let label = std::any::type_name::<F>();
  let call: StepCall<V, Err> = Box::new(move |previous| {
    let (tx, rx) = oneshot::channel();
    step_fn(bound, previous, Done { tx });
    Box::pin(async move {
      match rx.await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
          event!(Level::ERROR, step = label, "Step dropped its completion handle.");
          Err(Err::from(SluiceError::StepAbandoned { step: label.to_string() }))
        }
      }
    })
  });
  Some(AdaptedStep { label, call })
}
