pub mod control;
pub mod seed;
pub mod sequencer;
pub mod shared;
pub mod step;

// Re-export key types for easier access from other sluice modules (and lib.rs)
pub use control::RunState;
pub use seed::{make_seed, Aggregate};
pub use sequencer::{Sequencer, Waterfall};
pub use shared::Shared;
pub use step::{adapt, adapt_callback, AdaptedStep, Done, StepFuture};
