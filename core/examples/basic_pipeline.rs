// sluice/examples/basic_pipeline.rs

use sluice::{Pipeline, SluiceError};
use tracing::info;

// Step functions take their bound argument first, then the previous result.
async fn concat(letter: &'static str, prev: String) -> Result<String, SluiceError> {
  info!("Appending '{}' to '{}'", letter, prev);
  Ok(prev + letter)
}

async fn sum(n: i64, prev: i64) -> Result<i64, SluiceError> {
  Ok(prev + n)
}

async fn minus(n: i64, prev: i64) -> Result<i64, SluiceError> {
  Ok(prev - n)
}

#[tokio::main]
async fn main() -> Result<(), SluiceError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 1. Concatenation: seed "", then A, B, C.
  let mut letters = Pipeline::<String, SluiceError>::new(String::new()).with_name("letters");
  letters.pipe(concat, "A")?.pipe(concat, "B")?.pipe(concat, "C")?;
  let word = letters.run().await?;
  info!("Letters pipeline produced: {}", word);
  assert_eq!(word, "ABC");

  // 2. Arithmetic, with steps added one call at a time on the same pipeline.
  let mut numbers = Pipeline::<i64, SluiceError>::new(0).with_name("numbers");
  numbers.pipe(sum, 1)?;
  numbers.pipe(sum, 2)?;
  numbers.pipe(sum, 3)?;
  numbers.pipe(minus, 1)?;
  info!("Numbers pipeline has {} steps", numbers.len());

  // 3. Callback flavour: the outcome goes to a completion closure.
  let mut total = None;
  numbers.end(Some(|outcome: Result<i64, SluiceError>| total = outcome.ok())).await?;
  info!("Numbers pipeline produced: {:?}", total);
  assert_eq!(total, Some(5));

  Ok(())
}
