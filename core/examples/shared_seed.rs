// sluice/examples/shared_seed.rs

use serde_json::{json, Value};
use sluice::{Pipeline, Shared, SluiceError};
use tracing::info;

// Writes `key: key` into the shared object and hands the same handle on.
async fn joiner(key: &'static str, initial: Shared<Value>) -> Result<Shared<Value>, SluiceError> {
  initial.write()[key] = json!(key);
  Ok(initial)
}

#[tokio::main]
async fn main() -> Result<(), SluiceError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Shared Seed Example ---");

  // Several seed values are shallow-merged into one fresh object; later keys win.
  let defaults = Shared::new(json!({"mode": "fast", "retries": 1}));
  let overrides = Shared::new(json!({"retries": 3}));

  let mut pipeline = Pipeline::<Shared<Value>, SluiceError>::from_seeds([defaults.clone(), overrides]);
  pipeline.pipe(joiner, "a")?.pipe(joiner, "b")?;

  let result = pipeline.run().await?;
  info!("Merged and joined: {}", *result.read());
  info!("Defaults untouched: {}", *defaults.read());

  assert_eq!(*result.read(), json!({"mode": "fast", "retries": 3, "a": "a", "b": "b"}));
  assert_eq!(*defaults.read(), json!({"mode": "fast", "retries": 1}));
  Ok(())
}
