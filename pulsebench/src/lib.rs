#![warn(missing_docs)]
//! # PulseBench
//!
//! Micro-benchmarking harness: register named units of work, run them with a
//! warm-up phase and a measured phase, and get throughput, latency and
//! resident-memory growth per case.
//!
//! - **Honest timing windows**: only the iterate call is timed; `before_each`,
//!   the per-iteration `AfterEach` and `after_all` never are
//! - **Warm-up separation**: warm-up samples are discarded before measurement
//! - **Lazy results**: `run()` is a stream; each case runs when its result is requested
//! - **Sync and async**: factories, hooks and iterate functions may be either
//! - **Injected probes**: swap the system clock/RSS for a `ManualProbe` in tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use pulsebench::prelude::*;
//! use futures::StreamExt;
//!
//! let mut bench = Benchmark::new("collections", BenchmarkOptions::new())?;
//! bench.add_case(
//!     "vec push",
//!     || Iterate::new(|| {
//!         let mut v = Vec::with_capacity(64);
//!         for i in 0..64u64 {
//!             v.push(i);
//!         }
//!         std::hint::black_box(v);
//!     }),
//!     BenchmarkOptions::new().runs(1_000),
//! )?;
//!
//! let mut results = std::pin::pin!(bench.run());
//! while let Some(result) = results.next().await {
//!     let result = result?;
//!     println!("{}: {:.0} ops/s", result.name, result.operations_per_second);
//! }
//! ```
//!
//! ## Hooks
//!
//! ```ignore
//! bench.add_case(
//!     "sort",
//!     || {
//!         let data = Arc::new(Mutex::new(Vec::new()));
//!         let fill = Arc::clone(&data);
//!         Iterate::new(move || data.lock().unwrap().sort())
//!             .before_each(Hook::new(move || *fill.lock().unwrap() = shuffled(10_000)))
//!     },
//!     BenchmarkOptions::new(),
//! )?;
//! ```

mod benchmark;
mod case;
mod config;
mod error;
mod options;
mod result;

pub use benchmark::Benchmark;
pub use case::{BenchmarkCase, CaseState, FactoryOutput};
pub use config::{DefaultsConfig, PulseConfig};
pub use error::{BenchError, ConfigError, ValidationError};
pub use options::{
    BenchmarkOptions, DEFAULT_RUNS, DEFAULT_WARM_UPS, OptionValue, ResolvedOptions,
};
pub use result::BenchmarkCaseResult;

// Re-export core types
pub use pulsebench_core::{
    AfterEach, Hook, HookOutput, Iterate, IterateOutput, Iteration, IterationSpec, ManualProbe,
    Probe, Sample, Sampler, SystemProbe, Timestamp,
};

// Re-export stats
pub use pulsebench_stats::{CaseSummary, Throughput, summarize};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AfterEach, BenchError, Benchmark, BenchmarkCaseResult, BenchmarkOptions, Hook, Iterate,
        IterationSpec, ValidationError,
    };
}
