// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use once_cell::sync::Lazy;
use sluice::{Done, SluiceError};
use std::future::Future;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)] // Clone, PartialEq, Eq for assertions
pub enum TestError {
  #[error("Sluice framework error: {0}")]
  Sluice(String), // Stored as Debug string so TestError stays Eq

  #[error("Test step failed: {0}")]
  Step(String),
}

impl From<SluiceError> for TestError {
  fn from(se: SluiceError) -> Self {
    TestError::Sluice(format!("{:?}", se))
  }
}

// --- Common Step Functions ---

/// Appends `letter` to the previous string.
pub async fn concat(letter: &'static str, prev: String) -> Result<String, TestError> {
  Ok(prev + letter)
}

pub async fn sum(n: i64, prev: i64) -> Result<i64, TestError> {
  Ok(prev + n)
}

pub async fn minus(n: i64, prev: i64) -> Result<i64, TestError> {
  Ok(prev - n)
}

/// Passes the previous value through untouched, whatever it is bound to.
pub async fn pass_through<A, V>(_bound: A, prev: V) -> Result<V, TestError> {
  Ok(prev)
}

pub async fn fail_with(message: &'static str, _prev: String) -> Result<String, TestError> {
  Err(TestError::Step(message.to_string()))
}

/// Callback-style concatenation that reports from a spawned task after a short delay.
pub fn deferred_concat(letter: &'static str, prev: String, done: Done<String, TestError>) {
  tokio::spawn(async move {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    done.ok(prev + letter);
  });
}

/// A step that records every call on `counter` and passes the value through.
pub fn spy_step<V: Send + 'static>(
  counter: Arc<AtomicUsize>,
) -> impl FnOnce((), V) -> std::future::Ready<Result<V, TestError>> + Send + 'static {
  move |(), prev| {
    counter.fetch_add(1, Ordering::SeqCst);
    std::future::ready(Ok(prev))
  }
}

/// A step that records the previous value it received before appending `letter`.
pub fn recording_concat(
  seen: Arc<parking_lot::Mutex<Vec<String>>>,
) -> impl FnOnce(&'static str, String) -> std::pin::Pin<Box<dyn Future<Output = Result<String, TestError>> + Send>>
     + Send
     + 'static {
  move |letter, prev| {
    seen.lock().push(prev.clone());
    Box::pin(async move { Ok::<_, TestError>(prev + letter) })
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static STEP_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static SPY_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_EXEC_COUNTER.store(0, Ordering::SeqCst);
  SPY_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn counted_step<V: Send + 'static>() -> impl FnOnce((), V) -> std::future::Ready<Result<V, TestError>> + Send + 'static {
  spy_step(STEP_EXEC_COUNTER.clone())
}
