//! Case Summary
//!
//! Reduces one case's measured samples (warm-up samples never get here) into
//! extremes, means and throughput. Everything is a single linear scan; nothing
//! is sorted.

use crate::rate::{NANOS_PER_MILLI, NANOS_PER_SECOND, scaled_ratio};
use pulsebench_core::Sample;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Operations completed per unit of time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Throughput {
    /// Operations per second
    pub per_second: f64,
    /// Operations per millisecond
    pub per_millisecond: f64,
    /// Operations per nanosecond
    pub per_nanosecond: f64,
}

impl Throughput {
    /// Throughput of `runs` operations taking `total_nanos` altogether.
    ///
    /// All three rates are `INFINITY` when `total_nanos` is zero, which happens
    /// when every iteration finishes below the clock's resolution.
    pub fn from_total(runs: u64, total_nanos: u128) -> Self {
        Self {
            per_second: scaled_ratio(runs, NANOS_PER_SECOND, total_nanos),
            per_millisecond: scaled_ratio(runs, NANOS_PER_MILLI, total_nanos),
            per_nanosecond: scaled_ratio(runs, 1, total_nanos),
        }
    }
}

/// Summary of one case's measured samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// Number of samples reduced
    pub runs: u64,
    /// Sum of all elapsed times, in nanoseconds
    pub total_elapsed_nanos: u128,
    /// Throughput over the whole measurement
    pub throughput: Throughput,
    /// Fastest iteration
    pub min_elapsed: Duration,
    /// Slowest iteration
    pub max_elapsed: Duration,
    /// Total elapsed divided by runs, truncated to whole nanoseconds
    pub average_elapsed: Duration,
    /// Smallest memory delta in bytes
    pub min_memory_delta: i64,
    /// Largest memory delta in bytes
    pub max_memory_delta: i64,
    /// Arithmetic mean of memory deltas in bytes
    pub average_memory_delta: f64,
}

/// Reduce `samples` into a [`CaseSummary`].
///
/// Returns `None` for an empty slice.
pub fn summarize(samples: &[Sample]) -> Option<CaseSummary> {
    let first = samples.first()?;

    let mut min_elapsed = first.elapsed;
    let mut max_elapsed = first.elapsed;
    let mut total_elapsed_nanos: u128 = 0;

    let mut min_memory_delta = first.memory_delta;
    let mut max_memory_delta = first.memory_delta;
    let mut total_memory_delta: i128 = 0;

    for sample in samples {
        min_elapsed = min_elapsed.min(sample.elapsed);
        max_elapsed = max_elapsed.max(sample.elapsed);
        total_elapsed_nanos += sample.elapsed.as_nanos();

        min_memory_delta = min_memory_delta.min(sample.memory_delta);
        max_memory_delta = max_memory_delta.max(sample.memory_delta);
        total_memory_delta += i128::from(sample.memory_delta);
    }

    let runs = samples.len() as u64;
    let average_nanos = total_elapsed_nanos / u128::from(runs);
    let average_elapsed = Duration::from_nanos(u64::try_from(average_nanos).unwrap_or(u64::MAX));

    Some(CaseSummary {
        runs,
        total_elapsed_nanos,
        throughput: Throughput::from_total(runs, total_elapsed_nanos),
        min_elapsed,
        max_elapsed,
        average_elapsed,
        min_memory_delta,
        max_memory_delta,
        average_memory_delta: total_memory_delta as f64 / runs as f64,
    })
}
