#![warn(missing_docs)]
//! PulseBench Core - Sampling Runtime
//!
//! This crate provides the execution primitives for benchmarks:
//! - `Probe` capability (monotonic clock + resident memory) with a system
//!   implementation and a manually driven one for deterministic tests
//! - Iteration shapes (`IterationSpec`) normalized into a single `Iteration`
//! - `Sampler`, which times exactly the iterate call and nothing else

mod iteration;
mod measure;
mod sampler;

pub use iteration::{
    AfterEach, Hook, HookFuture, HookOutput, Iterate, IterateOutput, Iteration, IterationSpec,
};
pub use measure::{ManualProbe, Probe, SystemProbe, Timestamp};
pub use sampler::{Sample, Sampler};
