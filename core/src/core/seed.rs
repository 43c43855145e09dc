// sluice/src/core/seed.rs

//! Seed initialization: turning zero or more construction values into the single value
//! fed to the first step.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde_json::{Map, Value};

use super::shared::Shared;

/// A value with an empty form and a shallow, key-wise merge.
///
/// `merge_from` copies every top-level entry of `source` into `self`, overwriting
/// entries that already exist. Nested values are replaced wholesale, never merged.
pub trait Aggregate: Sized {
  fn empty() -> Self;

  fn merge_from(&mut self, source: &Self);
}

/// Builds a seed from construction values.
///
/// - no values: `Aggregate::empty()`
/// - one value: that value, untouched
/// - several: a fresh empty aggregate with every value merged in, left to right
///
/// Inputs are only read; the merge target is always a new aggregate.
pub fn make_seed<V: Aggregate>(values: impl IntoIterator<Item = V>) -> V {
  let mut values: Vec<V> = values.into_iter().collect();
  match values.len() {
    0 => V::empty(),
    1 => values.remove(0),
    _ => {
      let mut merged = V::empty();
      for value in &values {
        merged.merge_from(value);
      }
      merged
    }
  }
}

impl Aggregate for Value {
  fn empty() -> Self {
    Value::Object(Map::new())
  }

  // Only object sources contribute keys; scalars, arrays and null are skipped so the
  // target stays an object.
  fn merge_from(&mut self, source: &Self) {
    let Value::Object(src) = source else {
      return;
    };
    match self {
      Value::Object(target) => target.merge_from(src),
      other => *other = Value::Object(src.clone()),
    }
  }
}

impl Aggregate for Map<String, Value> {
  fn empty() -> Self {
    Map::new()
  }

  fn merge_from(&mut self, source: &Self) {
    for (k, v) in source {
      self.insert(k.clone(), v.clone());
    }
  }
}

impl<K, V> Aggregate for HashMap<K, V>
where
  K: Eq + Hash + Clone,
  V: Clone,
{
  fn empty() -> Self {
    HashMap::new()
  }

  fn merge_from(&mut self, source: &Self) {
    self.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
  }
}

impl<K, V> Aggregate for BTreeMap<K, V>
where
  K: Ord + Clone,
  V: Clone,
{
  fn empty() -> Self {
    BTreeMap::new()
  }

  fn merge_from(&mut self, source: &Self) {
    self.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
  }
}

impl<T> Aggregate for Shared<T>
where
  T: Aggregate + Send + Sync + 'static,
{
  fn empty() -> Self {
    Shared::new(T::empty())
  }

  fn merge_from(&mut self, source: &Self) {
    // Merging a handle into itself is the identity; locking twice would deadlock.
    if self.ptr_eq(source) {
      return;
    }
    let src = source.read();
    self.write().merge_from(&src);
  }
}
