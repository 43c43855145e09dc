// sluice/src/pipeline/mod.rs

//! Defines the `Pipeline<V, Err>` struct: construction and chaining live in `definition`,
//! the one-shot run in `execution`.

pub mod definition;
pub mod execution;

pub use definition::Pipeline;
