// tests/seed_and_sequencer_tests.rs
mod common;
use common::*;

use async_trait::async_trait;
use serde_json::{json, Value};
use serial_test::serial;
use sluice::{AdaptedStep, Pipeline, Sequencer, Shared, Waterfall};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_seed_merge_laws_through_pipeline() {
  setup_tracing();
  let cases = vec![
    (vec![], json!({})),
    (vec![json!({"a": 1}), json!({"b": 2})], json!({"a": 1, "b": 2})),
    (vec![json!({"a": 1}), json!({"a": 2})], json!({"a": 2})),
  ];
  for (values, expected) in cases {
    let mut pipeline = Pipeline::<Value, TestError>::from_seeds(values);
    assert_eq!(pipeline.run().await.unwrap(), expected);
  }
}

#[tokio::test]
#[serial]
async fn test_btree_map_seed_feeds_first_step() {
  setup_tracing();
  let defaults = BTreeMap::from([("retries", 1), ("timeout", 30)]);
  let overrides = BTreeMap::from([("timeout", 5)]);
  let mut pipeline = Pipeline::<BTreeMap<&'static str, i32>, TestError>::from_seeds([defaults, overrides]);
  pipeline
    .pipe(
      |key: &'static str, mut cfg: BTreeMap<&'static str, i32>| async move {
        *cfg.entry(key).or_insert(0) += 1;
        Ok::<_, TestError>(cfg)
      },
      "retries",
    )
    .unwrap();

  let cfg = pipeline.run().await.unwrap();
  assert_eq!(cfg, BTreeMap::from([("retries", 2), ("timeout", 5)]));
}

#[tokio::test]
#[serial]
async fn test_merged_shared_seed_leaves_inputs_alone() {
  setup_tracing();
  let first = Shared::new(json!({"a": 1}));
  let second = Shared::new(json!({"b": 2}));
  let mut pipeline = Pipeline::<Shared<Value>, TestError>::from_seeds([first.clone(), second.clone()]);
  pipeline
    .pipe(
      |(), seed: Shared<Value>| async move {
        seed.write()["c"] = json!(3);
        Ok::<_, TestError>(seed)
      },
      (),
    )
    .unwrap();

  let result = pipeline.run().await.unwrap();
  assert_eq!(*result.read(), json!({"a": 1, "b": 2, "c": 3}));
  assert_eq!(*first.read(), json!({"a": 1}));
  assert_eq!(*second.read(), json!({"b": 2}));
}

/// Counts executions and step totals, then delegates to the default waterfall.
#[derive(Default)]
struct CountingSequencer {
  runs: Arc<AtomicUsize>,
  steps_seen: Arc<AtomicUsize>,
}

#[async_trait]
impl Sequencer<String, TestError> for CountingSequencer {
  async fn execute(&self, seed: String, steps: Vec<AdaptedStep<String, TestError>>) -> Result<String, TestError> {
    self.runs.fetch_add(1, Ordering::SeqCst);
    self.steps_seen.fetch_add(steps.len(), Ordering::SeqCst);
    Waterfall.execute(seed, steps).await
  }
}

#[tokio::test]
#[serial]
async fn test_custom_sequencer_drives_the_run() {
  setup_tracing();
  let runs = Arc::new(AtomicUsize::new(0));
  let steps_seen = Arc::new(AtomicUsize::new(0));
  let sequencer = CountingSequencer {
    runs: runs.clone(),
    steps_seen: steps_seen.clone(),
  };

  let mut pipeline = Pipeline::<String, TestError>::new(String::new()).with_sequencer(sequencer);
  pipeline
    .pipe(concat, "A")
    .unwrap()
    .pipe_opt(None::<fn((), String) -> std::future::Ready<Result<String, TestError>>>, ())
    .unwrap()
    .pipe(concat, "B")
    .unwrap();

  assert_eq!(pipeline.run().await.unwrap(), "AB");
  assert_eq!(runs.load(Ordering::SeqCst), 1);
  assert_eq!(steps_seen.load(Ordering::SeqCst), 2, "no-op appends never reach the sequencer");

  assert!(pipeline.run().await.is_err());
  assert_eq!(runs.load(Ordering::SeqCst), 1, "a rejected run never reaches the sequencer");
}

/// Runs steps by hand, the way any sequencer honouring the contract would.
struct ManualSequencer;

#[async_trait]
impl Sequencer<i64, TestError> for ManualSequencer {
  async fn execute(&self, seed: i64, steps: Vec<AdaptedStep<i64, TestError>>) -> Result<i64, TestError> {
    let mut acc = seed;
    for step in steps {
      acc = step.invoke(acc).await?;
    }
    Ok(acc)
  }
}

#[tokio::test]
#[serial]
async fn test_substituted_sequencer_keeps_semantics() {
  setup_tracing();
  let mut pipeline = Pipeline::<i64, TestError>::new(0).with_sequencer(ManualSequencer);
  pipeline
    .pipe(sum, 1)
    .unwrap()
    .pipe(sum, 2)
    .unwrap()
    .pipe(sum, 3)
    .unwrap()
    .pipe(minus, 1)
    .unwrap();
  assert_eq!(pipeline.run().await.unwrap(), 5);
}
