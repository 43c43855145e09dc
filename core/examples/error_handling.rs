// sluice/examples/error_handling.rs

use sluice::{Pipeline, SluiceError};
use tracing::{error, info};

// 1. Define a custom application error type
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("A custom application error occurred: {0}")]
  CustomError(String),

  #[error("Sluice framework error during pipeline execution: {0}")]
  SluiceFramework(#[from] SluiceError), // Allows SluiceError to be converted into ExampleAppError
}

async fn record(name: &'static str, mut prev: Vec<String>) -> Result<Vec<String>, ExampleAppError> {
  info!("Executing {}", name);
  prev.push(name.to_string());
  Ok(prev)
}

async fn explode(name: &'static str, _prev: Vec<String>) -> Result<Vec<String>, ExampleAppError> {
  info!("Executing {} - this will error", name);
  Err(ExampleAppError::CustomError(format!("Something went wrong in {}!", name)))
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  info!("\nScenario 1: A step returns a custom error");
  run_pipeline_with_step_error().await;

  info!("\nScenario 2: Guard errors (second run, missing completion)");
  run_pipeline_with_guard_errors().await;
}

async fn run_pipeline_with_step_error() {
  let mut pipeline = Pipeline::<Vec<String>, ExampleAppError>::new(Vec::new());
  let appended = pipeline
    .pipe(record, "step_one")
    .and_then(|p| p.pipe(explode, "step_two_fails"))
    .and_then(|p| p.pipe(record, "step_three")); // Should not run
  if let Err(e) = appended {
    error!("Could not build pipeline: {}", e);
    return;
  }

  match pipeline.run().await {
    Ok(steps) => info!("Pipeline unexpectedly succeeded: {:?}", steps),
    Err(ExampleAppError::CustomError(msg)) => info!("Pipeline failed as expected: {}", msg),
    Err(other) => error!("Unexpected error kind: {}", other),
  }
}

async fn run_pipeline_with_guard_errors() {
  let mut pipeline = Pipeline::<Vec<String>, ExampleAppError>::new(Vec::new());
  if let Err(e) = pipeline.pipe(record, "only_step") {
    error!("Could not build pipeline: {}", e);
    return;
  }

  // Ending without a completion is rejected up front and leaves the pipeline runnable.
  match pipeline.end(None::<fn(Result<Vec<String>, ExampleAppError>)>).await {
    Err(e) if e.is_guard() => info!("Rejected by the pipeline guard: {}", e),
    Err(e) => error!("Unexpected non-guard error: {}", e),
    Ok(()) => error!("end(None) should have been rejected"),
  }

  match pipeline.run().await {
    Ok(steps) => info!("First run produced: {:?}", steps),
    Err(e) => error!("First run failed: {}", e),
  }

  match pipeline.run().await {
    Err(ExampleAppError::SluiceFramework(e)) if e.is_guard() => info!("Second run rejected: {}", e),
    other => error!("Expected an AlreadyRun rejection, got {:?}", other),
  }

  match pipeline.pipe(record, "too_late") {
    Err(e) if e.is_guard() => info!("Late append rejected: {}", e),
    Err(e) => error!("Unexpected non-guard error: {}", e),
    Ok(_) => error!("Append after run should have been rejected"),
  }
}
