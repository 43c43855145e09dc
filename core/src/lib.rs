// src/lib.rs

//! Sluice: a small asynchronous waterfall pipeline builder.
//!
//! A pipeline is a seed value plus an ordered list of steps. Each step is a user
//! function bound to a fixed argument when it is added; at run time it receives that
//! argument and the previous step's result, and produces the next result:
//!  - Steps are appended in place and run strictly in insertion order, one at a time.
//!  - Each step's result is the next step's input; the last result is the run's result.
//!  - The first failing step ends the run and its error is reported as is.
//!  - A pipeline runs at most once; later appends and runs are rejected.
//!  - Seeds can be built from several aggregate values by shallow merge.
//!  - Steps can be async functions or callback-style functions reporting through `Done`.

pub mod core;
pub mod pipeline;
pub mod error;

// --- Re-exports for the Public API ---

pub use crate::core::control::RunState;
pub use crate::core::seed::{make_seed, Aggregate};
pub use crate::core::sequencer::{Sequencer, Waterfall};
pub use crate::core::shared::Shared;
pub use crate::core::step::{adapt, adapt_callback, AdaptedStep, Done, StepFuture};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{SluiceError, SluiceResult};

/*
    Core Workflow:
    1. Pick the value type `V` threaded through the steps and an error type `Err`
       implementing `From<SluiceError>` (or use `SluiceError` itself).
    2. Create a `Pipeline<V, Err>`: `Pipeline::new(seed)`, or `Pipeline::from_seeds([...])`
       for aggregate seeds.
    3. Chain steps: `pipeline.pipe(step_fn, bound_arg)?.pipe(other, arg)?`, where
       `step_fn(bound_arg, previous)` returns a future of `Result<V, UserErr>`.
    4. Run once: `pipeline.run().await` or `pipeline.end(Some(|outcome| ...)).await`.
*/
