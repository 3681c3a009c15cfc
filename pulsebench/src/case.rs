//! Benchmark Cases
//!
//! A case is a name, a factory and its option overrides. The factory is called
//! once per run, before any sampling, and its own duration is never measured.

use crate::options::BenchmarkOptions;
use futures::future::BoxFuture;
use pulsebench_core::{Iterate, IterationSpec};
use std::fmt;
use std::future::Future;

type FactoryFuture = BoxFuture<'static, anyhow::Result<IterationSpec>>;

/// Values a case factory may produce: an [`Iterate`], an [`IterationSpec`],
/// or either wrapped in a `Result`.
pub trait FactoryOutput {
    /// Convert into the iteration spec to sample
    fn into_spec(self) -> anyhow::Result<IterationSpec>;
}

impl FactoryOutput for IterationSpec {
    fn into_spec(self) -> anyhow::Result<IterationSpec> {
        Ok(self)
    }
}

impl FactoryOutput for Iterate {
    fn into_spec(self) -> anyhow::Result<IterationSpec> {
        Ok(IterationSpec::Simple(self))
    }
}

impl<T, E> FactoryOutput for Result<T, E>
where
    T: FactoryOutput,
    E: Into<anyhow::Error>,
{
    fn into_spec(self) -> anyhow::Result<IterationSpec> {
        self.map_err(Into::into)?.into_spec()
    }
}

pub(crate) enum Factory {
    Sync(Box<dyn Fn() -> anyhow::Result<IterationSpec> + Send + Sync>),
    Async(Box<dyn Fn() -> FactoryFuture + Send + Sync>),
}

impl Factory {
    pub(crate) fn new<F, S>(f: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: FactoryOutput,
    {
        Factory::Sync(Box::new(move || f().into_spec()))
    }

    pub(crate) fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: FactoryOutput,
    {
        Factory::Async(Box::new(move || {
            let fut = f();
            Box::pin(async move { fut.await.into_spec() })
        }))
    }

    pub(crate) async fn invoke(&self) -> anyhow::Result<IterationSpec> {
        match self {
            Factory::Sync(f) => f(),
            Factory::Async(f) => f().await,
        }
    }
}

/// A registered unit of work
pub struct BenchmarkCase {
    pub(crate) name: String,
    pub(crate) factory: Factory,
    pub(crate) options: BenchmarkOptions,
}

impl BenchmarkCase {
    /// Case name, not necessarily unique within a registry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overrides supplied at registration
    pub fn options(&self) -> &BenchmarkOptions {
        &self.options
    }
}

impl fmt::Debug for BenchmarkCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factory = match self.factory {
            Factory::Sync(_) => "sync",
            Factory::Async(_) => "async",
        };
        f.debug_struct("BenchmarkCase")
            .field("name", &self.name)
            .field("factory", &factory)
            .field("options", &self.options)
            .finish()
    }
}

/// Where a case is in its run.
///
/// States only move forward; `Completed` yields exactly one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CaseState {
    /// Not started
    Pending,
    /// Factory resolved and normalized
    FactoryInvoked,
    /// Running discarded iterations
    WarmingUp,
    /// Running measured iterations
    Measuring,
    /// Running `after_all`
    TearingDown,
    /// Result produced
    Completed,
}

impl CaseState {
    pub(crate) fn advance(&mut self, next: CaseState, case: &str) {
        debug_assert!(next > *self, "case state moved backwards: {self:?} -> {next:?}");
        tracing::trace!(case, from = ?*self, to = ?next, "case state");
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_shapes() {
        let factory = Factory::new(|| Iterate::new(|| {}));
        assert!(matches!(
            factory.invoke().await.unwrap(),
            IterationSpec::Simple(_)
        ));

        let factory =
            Factory::new(|| anyhow::Ok(Iterate::new(|| {}).after_all(Default::default())));
        assert!(matches!(
            factory.invoke().await.unwrap(),
            IterationSpec::Full { .. }
        ));

        let factory = Factory::new_async(|| async { Iterate::new(|| {}) });
        assert!(factory.invoke().await.is_ok());
    }

    #[tokio::test]
    async fn test_factory_error_propagates() {
        let factory = Factory::new(|| Err::<Iterate, _>(anyhow::anyhow!("fixture missing")));
        let err = factory.invoke().await.unwrap_err();
        assert_eq!(err.to_string(), "fixture missing");
    }

    #[test]
    fn test_state_advances_forward() {
        let mut state = CaseState::Pending;
        state.advance(CaseState::FactoryInvoked, "case");
        state.advance(CaseState::WarmingUp, "case");
        assert_eq!(state, CaseState::WarmingUp);
    }
}
