#![warn(missing_docs)]
//! PulseBench Statistical Reduction
//!
//! Turns the measured samples of one case into a summary:
//! - Throughput per second, millisecond and nanosecond
//! - Min/max/mean elapsed time by linear scan
//! - Min/max/mean resident-memory delta
//!
//! Elapsed totals are accumulated as `u128` nanoseconds and divided with an
//! exact-integer fallback once they leave the range an `f64` holds exactly.

mod rate;
mod summary;

pub use rate::{MAX_SAFE_INTEGER, NANOS_PER_MILLI, NANOS_PER_SECOND, scaled_ratio};
pub use summary::{CaseSummary, Throughput, summarize};
