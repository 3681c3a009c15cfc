//! Benchmark Registry & Runner
//!
//! Holds named cases in registration order and runs them one at a time.
//!
//! ## Data Flow
//!
//! ```text
//! Benchmark::add_case (validated at registration)
//!        │
//!        ▼
//!   Benchmark::run() ── lazy stream, one case per poll
//!        │
//!        ▼
//! ┌──────────────────┐
//! │  run_case        │  Factory → Warm-up (discarded) → Measure → after_all
//! └────────┬─────────┘
//!          │
//!          ▼
//!  summarize → BenchmarkCaseResult
//! ```
//!
//! Nothing executes until the stream is polled, and the next case only starts
//! once the caller asks for its result. Dropping the stream stops the run.

use crate::case::{BenchmarkCase, CaseState, Factory, FactoryOutput};
use crate::config::PulseConfig;
use crate::error::{BenchError, ValidationError};
use crate::options::{BenchmarkOptions, ResolvedOptions};
use crate::result::BenchmarkCaseResult;
use futures::stream::{self, Stream, TryStreamExt};
use pulsebench_core::{Probe, Sampler, SystemProbe};
use pulsebench_stats::summarize;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// A named collection of benchmark cases sharing default options
pub struct Benchmark {
    name: String,
    defaults: ResolvedOptions,
    cases: Vec<BenchmarkCase>,
    probe: Arc<dyn Probe>,
}

impl Benchmark {
    /// Create a registry.
    ///
    /// Unset options default to 100 warm-ups and 100 runs. Fails if `runs` is 0.
    pub fn new(
        name: impl Into<String>,
        options: BenchmarkOptions,
    ) -> Result<Self, ValidationError> {
        options.validate()?;
        Ok(Self {
            name: name.into(),
            defaults: options.resolve(&ResolvedOptions::default()),
            cases: Vec::new(),
            probe: Arc::new(SystemProbe::new()),
        })
    }

    /// Create a registry whose defaults come from a configuration file
    pub fn from_config(
        name: impl Into<String>,
        config: &PulseConfig,
    ) -> Result<Self, ValidationError> {
        Self::new(name, config.options()?)
    }

    /// Measure with `probe` instead of the system clock and RSS
    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Register a case with a synchronous factory.
    ///
    /// The factory runs once per [`Benchmark::run`], lazily, and is not timed.
    pub fn add_case<F, S>(
        &mut self,
        name: impl Into<String>,
        factory: F,
        options: BenchmarkOptions,
    ) -> Result<&mut Self, ValidationError>
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: FactoryOutput,
    {
        self.push_case(name.into(), Factory::new(factory), options)
    }

    /// Register a case with an asynchronous factory.
    ///
    /// The factory's future completes before any sampling begins.
    pub fn add_async_case<F, Fut>(
        &mut self,
        name: impl Into<String>,
        factory: F,
        options: BenchmarkOptions,
    ) -> Result<&mut Self, ValidationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: FactoryOutput,
    {
        self.push_case(name.into(), Factory::new_async(factory), options)
    }

    fn push_case(
        &mut self,
        name: String,
        factory: Factory,
        options: BenchmarkOptions,
    ) -> Result<&mut Self, ValidationError> {
        options.validate()?;
        self.cases.push(BenchmarkCase {
            name,
            factory,
            options,
        });
        Ok(self)
    }

    /// Registry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry-wide effective defaults
    pub fn defaults(&self) -> ResolvedOptions {
        self.defaults
    }

    /// Registered cases in registration order
    pub fn cases(&self) -> &[BenchmarkCase] {
        &self.cases
    }

    /// Number of registered cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether no case is registered
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Run every case in registration order, one result per poll.
    ///
    /// Each call starts from scratch: factories are invoked again and nothing is
    /// cached. The first error is yielded and ends the stream; the failing case
    /// produces no result.
    pub fn run(&self) -> impl Stream<Item = Result<BenchmarkCaseResult, BenchError>> + Send + '_ {
        let sampler = Sampler::new(Arc::clone(&self.probe));

        stream::unfold(Some((0usize, sampler)), move |state| async move {
            let (index, sampler) = state?;
            let case = self.cases.get(index)?;

            let span =
                tracing::debug_span!("case", benchmark = %self.name, case = %case.name, index);
            match self.run_case(case, &sampler).instrument(span).await {
                Ok(result) => Some((Ok(result), Some((index + 1, sampler)))),
                Err(error) => Some((Err(error), None)),
            }
        })
    }

    /// Drive [`Benchmark::run`] to completion and collect every result
    pub async fn run_all(&self) -> Result<Vec<BenchmarkCaseResult>, BenchError> {
        self.run().try_collect().await
    }

    /// Blocking view of [`Benchmark::run`], still one case per `next()`.
    ///
    /// Runs on a minimal executor without a tokio reactor, so async cases that
    /// rely on tokio timers or I/O must use [`Benchmark::run`] inside a runtime.
    pub fn run_blocking(
        &self,
    ) -> impl Iterator<Item = Result<BenchmarkCaseResult, BenchError>> + '_ {
        futures::executor::block_on_stream(Box::pin(self.run()))
    }

    async fn run_case(
        &self,
        case: &BenchmarkCase,
        sampler: &Sampler,
    ) -> Result<BenchmarkCaseResult, BenchError> {
        let mut state = CaseState::Pending;
        let options = case.options.resolve(&self.defaults);
        tracing::debug!(warm_ups = options.warm_ups, runs = options.runs, "case started");

        let mut iteration = case.factory.invoke().await?.normalize();
        state.advance(CaseState::FactoryInvoked, &case.name);

        // Warm-up samples only prime caches and allocator state.
        state.advance(CaseState::WarmingUp, &case.name);
        sampler
            .sample(&mut iteration.iterate, &mut iteration.before_each, options.warm_ups)
            .await?;

        state.advance(CaseState::Measuring, &case.name);
        let samples = sampler
            .sample(&mut iteration.iterate, &mut iteration.before_each, options.runs)
            .await?;

        state.advance(CaseState::TearingDown, &case.name);
        iteration.after_all.call().await?;

        let summary = summarize(&samples).ok_or_else(|| BenchError::EmptyMeasurement {
            case: case.name.clone(),
        })?;
        state.advance(CaseState::Completed, &case.name);

        tracing::debug!(
            ops_per_sec = summary.throughput.per_second,
            avg_ns = summary.average_elapsed.as_nanos() as u64,
            "case completed"
        );
        Ok(BenchmarkCaseResult::new(&case.name, options, summary))
    }
}

impl std::fmt::Debug for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Benchmark")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("cases", &self.cases)
            .finish_non_exhaustive()
    }
}
