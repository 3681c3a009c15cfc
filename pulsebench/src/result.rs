//! Case Results

use crate::options::ResolvedOptions;
use pulsebench_stats::CaseSummary;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary of one case, produced once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCaseResult {
    /// Case name
    pub name: String,
    /// Effective warm-up count (case override, else registry default)
    pub warm_ups: u64,
    /// Effective measured run count (case override, else registry default)
    pub runs: u64,

    /// Measured iterations per second
    pub operations_per_second: f64,
    /// Measured iterations per millisecond
    pub operations_per_millisecond: f64,
    /// Measured iterations per nanosecond
    pub operations_per_nanosecond: f64,

    /// Slowest measured iteration
    pub max_elapsed: Duration,
    /// Fastest measured iteration
    pub min_elapsed: Duration,
    /// Mean measured iteration, truncated to whole nanoseconds
    pub average_elapsed: Duration,

    /// Bytes of resident memory gained (negative when released)
    pub max_memory_delta: i64,
    /// Smallest memory delta in bytes
    pub min_memory_delta: i64,
    /// Arithmetic mean of memory deltas in bytes
    pub average_memory_delta: f64,
}

impl BenchmarkCaseResult {
    pub(crate) fn new(name: &str, options: ResolvedOptions, summary: CaseSummary) -> Self {
        Self {
            name: name.to_string(),
            warm_ups: options.warm_ups,
            runs: options.runs,
            operations_per_second: summary.throughput.per_second,
            operations_per_millisecond: summary.throughput.per_millisecond,
            operations_per_nanosecond: summary.throughput.per_nanosecond,
            max_elapsed: summary.max_elapsed,
            min_elapsed: summary.min_elapsed,
            average_elapsed: summary.average_elapsed,
            max_memory_delta: summary.max_memory_delta,
            min_memory_delta: summary.min_memory_delta,
            average_memory_delta: summary.average_memory_delta,
        }
    }
}
