//! Sampler - Per-Iteration Measurement
//!
//! Executes an iterate function a fixed number of times and records one
//! [`Sample`] per call. The timing window covers exactly the iterate call:
//! `before_each` runs before the window opens and the returned `AfterEach`
//! runs after it closes, so setup and teardown never pollute a sample.

use crate::iteration::{Hook, Iterate};
use crate::measure::Probe;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on up-front sample buffer reservation
const MAX_PREALLOCATED_SAMPLES: u64 = 1 << 16;

/// One measured iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Time spent inside the iterate call
    pub elapsed: Duration,
    /// Resident memory after the call minus before it, in bytes
    pub memory_delta: i64,
}

impl Sample {
    /// Create a new sample with the given measurements
    #[inline]
    pub fn new(elapsed: Duration, memory_delta: i64) -> Self {
        Self {
            elapsed,
            memory_delta,
        }
    }
}

/// Runs iterations against a [`Probe`]
#[derive(Clone)]
pub struct Sampler {
    probe: Arc<dyn Probe>,
}

impl Sampler {
    /// Create a sampler reading from `probe`
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self { probe }
    }

    /// The probe used for measurements
    pub fn probe(&self) -> &dyn Probe {
        self.probe.as_ref()
    }

    /// Run `iterate` `times` times, strictly in sequence.
    ///
    /// Per iteration: `before_each`, open window, `iterate`, close window, then
    /// the `AfterEach` returned by `iterate` if any. The first error aborts the
    /// remaining iterations and is returned as-is.
    pub async fn sample(
        &self,
        iterate: &mut Iterate,
        before_each: &mut Hook,
        times: u64,
    ) -> anyhow::Result<Vec<Sample>> {
        let capacity = times.min(MAX_PREALLOCATED_SAMPLES) as usize;
        let mut samples = Vec::with_capacity(capacity);

        for _ in 0..times {
            before_each.call().await?;

            let start_memory = self.probe.resident_memory();
            let start = self.probe.now();

            let after_each = iterate.call().await?;

            let end = self.probe.now();
            let end_memory = self.probe.resident_memory();

            if let Some(after_each) = after_each {
                after_each.call().await?;
            }

            samples.push(Sample::new(
                end.duration_since(start),
                memory_delta(start_memory, end_memory),
            ));
        }

        Ok(samples)
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler").finish_non_exhaustive()
    }
}

/// Signed difference of two byte counts, saturating at the `i64` range
fn memory_delta(start: u64, end: u64) -> i64 {
    if end >= start {
        i64::try_from(end - start).unwrap_or(i64::MAX)
    } else {
        i64::try_from(start - end).map_or(i64::MIN, |d| -d)
    }
}
