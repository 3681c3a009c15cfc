//! Iteration Shapes
//!
//! A case factory produces an [`IterationSpec`]: either a bare iterate function
//! or an iterate function with `before_each` / `after_all` hooks. The runner
//! normalizes it once into an [`Iteration`], filling absent hooks with no-ops,
//! so the sampler never branches on shape.
//!
//! Every callable comes in a synchronous and an asynchronous flavour. The
//! synchronous flavour is called directly, without boxing a future inside the
//! timing window.

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;

/// Future returned by asynchronous hooks
pub type HookFuture = BoxFuture<'static, anyhow::Result<()>>;

type IterateFuture = BoxFuture<'static, anyhow::Result<Option<AfterEach>>>;

// ─── Output conversions ──────────────────────────────────────────────────────

/// Values a hook closure may return: `()` or `Result<(), E>`.
pub trait HookOutput {
    /// Convert into the hook's result
    fn into_result(self) -> anyhow::Result<()>;
}

impl HookOutput for () {
    #[inline(always)]
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> HookOutput for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    #[inline(always)]
    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// Values an iterate closure may return.
///
/// `()` ends the iteration; an [`AfterEach`] (or `Some` of one) schedules an
/// untimed hook for right after the timing window closes. Any of these may be
/// wrapped in a `Result`.
pub trait IterateOutput {
    /// Convert into the optional per-iteration hook
    fn into_outcome(self) -> anyhow::Result<Option<AfterEach>>;
}

impl IterateOutput for () {
    #[inline(always)]
    fn into_outcome(self) -> anyhow::Result<Option<AfterEach>> {
        Ok(None)
    }
}

impl IterateOutput for AfterEach {
    #[inline(always)]
    fn into_outcome(self) -> anyhow::Result<Option<AfterEach>> {
        Ok(Some(self))
    }
}

impl IterateOutput for Option<AfterEach> {
    #[inline(always)]
    fn into_outcome(self) -> anyhow::Result<Option<AfterEach>> {
        Ok(self)
    }
}

impl<T, E> IterateOutput for Result<T, E>
where
    T: IterateOutput,
    E: Into<anyhow::Error>,
{
    #[inline(always)]
    fn into_outcome(self) -> anyhow::Result<Option<AfterEach>> {
        self.map_err(Into::into)?.into_outcome()
    }
}

// ─── Hook ────────────────────────────────────────────────────────────────────

enum HookFn {
    Noop,
    Sync(Box<dyn FnMut() -> anyhow::Result<()> + Send>),
    Async(Box<dyn FnMut() -> HookFuture + Send>),
}

/// A repeatable lifecycle hook (`before_each` or `after_all`)
pub struct Hook {
    f: HookFn,
}

impl Hook {
    /// Hook that does nothing
    pub fn noop() -> Self {
        Self { f: HookFn::Noop }
    }

    /// Synchronous hook
    pub fn new<F, R>(mut f: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
        R: HookOutput,
    {
        Self {
            f: HookFn::Sync(Box::new(move || f().into_result())),
        }
    }

    /// Asynchronous hook; its future is awaited to completion
    pub fn new_async<F, Fut>(mut f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: HookOutput,
    {
        Self {
            f: HookFn::Async(Box::new(move || {
                let fut = f();
                Box::pin(async move { fut.await.into_result() })
            })),
        }
    }

    /// Whether this hook was filled in as a no-op
    pub fn is_noop(&self) -> bool {
        matches!(self.f, HookFn::Noop)
    }

    /// Run the hook once
    #[inline]
    pub async fn call(&mut self) -> anyhow::Result<()> {
        match &mut self.f {
            HookFn::Noop => Ok(()),
            HookFn::Sync(f) => f(),
            HookFn::Async(f) => f().await,
        }
    }
}

impl Default for Hook {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.f {
            HookFn::Noop => "noop",
            HookFn::Sync(_) => "sync",
            HookFn::Async(_) => "async",
        };
        f.debug_tuple("Hook").field(&kind).finish()
    }
}

// ─── AfterEach ───────────────────────────────────────────────────────────────

enum AfterEachFn {
    Sync(Box<dyn FnOnce() -> anyhow::Result<()> + Send>),
    Async(Box<dyn FnOnce() -> HookFuture + Send>),
}

/// One-shot hook returned by an iterate call.
///
/// Runs after that iteration's timing window closes; its cost is never measured.
pub struct AfterEach {
    f: AfterEachFn,
}

impl AfterEach {
    /// Synchronous per-iteration hook
    pub fn new<F, R>(f: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: HookOutput,
    {
        Self {
            f: AfterEachFn::Sync(Box::new(move || f().into_result())),
        }
    }

    /// Asynchronous per-iteration hook
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: HookOutput,
    {
        Self {
            f: AfterEachFn::Async(Box::new(move || {
                let fut = f();
                Box::pin(async move { fut.await.into_result() })
            })),
        }
    }

    /// Run and consume the hook
    pub async fn call(self) -> anyhow::Result<()> {
        match self.f {
            AfterEachFn::Sync(f) => f(),
            AfterEachFn::Async(f) => f().await,
        }
    }
}

impl fmt::Debug for AfterEach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.f {
            AfterEachFn::Sync(_) => "sync",
            AfterEachFn::Async(_) => "async",
        };
        f.debug_tuple("AfterEach").field(&kind).finish()
    }
}

// ─── Iterate ─────────────────────────────────────────────────────────────────

enum IterateFn {
    Sync(Box<dyn FnMut() -> anyhow::Result<Option<AfterEach>> + Send>),
    Async(Box<dyn FnMut() -> IterateFuture + Send>),
}

/// The unit of work under measurement.
///
/// The closure's return value passes through `std::hint::black_box`. Results
/// computed inside the closure that should not be optimized away need their own
/// `black_box`.
pub struct Iterate {
    f: IterateFn,
}

impl Iterate {
    /// Synchronous iterate function
    pub fn new<F, R>(mut f: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
        R: IterateOutput,
    {
        Self {
            f: IterateFn::Sync(Box::new(move || std::hint::black_box(f()).into_outcome())),
        }
    }

    /// Asynchronous iterate function; the whole future is inside the timing window
    pub fn new_async<F, Fut>(mut f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IterateOutput,
    {
        Self {
            f: IterateFn::Async(Box::new(move || {
                let fut = f();
                Box::pin(async move { std::hint::black_box(fut.await).into_outcome() })
            })),
        }
    }

    /// Attach a `before_each` hook
    pub fn before_each(self, hook: Hook) -> IterationSpec {
        IterationSpec::from(self).before_each(hook)
    }

    /// Attach an `after_all` hook
    pub fn after_all(self, hook: Hook) -> IterationSpec {
        IterationSpec::from(self).after_all(hook)
    }

    /// Run one iteration
    #[inline]
    pub async fn call(&mut self) -> anyhow::Result<Option<AfterEach>> {
        match &mut self.f {
            IterateFn::Sync(f) => f(),
            IterateFn::Async(f) => f().await,
        }
    }
}

impl fmt::Debug for Iterate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.f {
            IterateFn::Sync(_) => "sync",
            IterateFn::Async(_) => "async",
        };
        f.debug_tuple("Iterate").field(&kind).finish()
    }
}

// ─── IterationSpec ───────────────────────────────────────────────────────────

/// What a case factory produces
#[derive(Debug)]
pub enum IterationSpec {
    /// A bare iterate function
    Simple(Iterate),
    /// An iterate function with optional lifecycle hooks
    Full {
        /// The measured function
        iterate: Iterate,
        /// Runs before every iteration, untimed
        before_each: Option<Hook>,
        /// Runs once after the last measured iteration, untimed
        after_all: Option<Hook>,
    },
}

impl IterationSpec {
    /// Set the `before_each` hook, replacing any previous one
    pub fn before_each(self, hook: Hook) -> Self {
        let (iterate, _, after_all) = self.into_parts();
        IterationSpec::Full {
            iterate,
            before_each: Some(hook),
            after_all,
        }
    }

    /// Set the `after_all` hook, replacing any previous one
    pub fn after_all(self, hook: Hook) -> Self {
        let (iterate, before_each, _) = self.into_parts();
        IterationSpec::Full {
            iterate,
            before_each,
            after_all: Some(hook),
        }
    }

    /// Collapse both shapes into one record with no-op defaults
    pub fn normalize(self) -> Iteration {
        let (iterate, before_each, after_all) = self.into_parts();
        Iteration {
            iterate,
            before_each: before_each.unwrap_or_default(),
            after_all: after_all.unwrap_or_default(),
        }
    }

    fn into_parts(self) -> (Iterate, Option<Hook>, Option<Hook>) {
        match self {
            IterationSpec::Simple(iterate) => (iterate, None, None),
            IterationSpec::Full {
                iterate,
                before_each,
                after_all,
            } => (iterate, before_each, after_all),
        }
    }
}

impl From<Iterate> for IterationSpec {
    fn from(iterate: Iterate) -> Self {
        IterationSpec::Simple(iterate)
    }
}

/// Normalized iteration record driven by the sampler and runner
#[derive(Debug)]
pub struct Iteration {
    /// The measured function
    pub iterate: Iterate,
    /// Runs before every iteration (warm-up and measured), untimed
    pub before_each: Hook,
    /// Runs once per case after the last measured iteration, untimed
    pub after_all: Hook,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_simple_spec_normalizes_to_noop_hooks() {
        let iteration = IterationSpec::from(Iterate::new(|| {})).normalize();
        assert!(iteration.before_each.is_noop());
        assert!(iteration.after_all.is_noop());
    }

    #[test]
    fn test_full_spec_keeps_supplied_hooks() {
        let iteration = Iterate::new(|| {})
            .before_each(Hook::new(|| {}))
            .normalize();
        assert!(!iteration.before_each.is_noop());
        assert!(iteration.after_all.is_noop());
    }

    #[tokio::test]
    async fn test_iterate_returns_after_each() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut iterate = Iterate::new(move || {
            let counter = Arc::clone(&counter);
            AfterEach::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });

        let after_each = iterate.call().await.unwrap().expect("hook returned");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        after_each.call().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_iterate_and_hooks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut iterate = Iterate::new_async(move || {
            let counter = Arc::clone(&counter);
            async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let mut hook = Hook::new_async(|| async { anyhow::Ok(()) });

        hook.call().await.unwrap();
        assert!(iterate.call().await.unwrap().is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_surface_unchanged() {
        let mut iterate = Iterate::new(|| -> anyhow::Result<()> { anyhow::bail!("boom") });
        let err = iterate.call().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let mut hook = Hook::new(|| Err::<(), _>(std::io::Error::other("disk gone")));
        let err = hook.call().await.unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
