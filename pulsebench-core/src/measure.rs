//! Clock and Resident-Memory Probes
//!
//! The sampler never reads the clock or the OS directly. It asks a [`Probe`],
//! so measurements can be replaced by deterministic fakes in tests.
//! [`SystemProbe`] uses `std::time::Instant` and the process resident set size.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

// ─── Timestamp ───────────────────────────────────────────────────────────────

/// Monotonic timestamp in nanoseconds since the probe's epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Timestamp `nanos` nanoseconds after the epoch
    #[inline(always)]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Nanoseconds since the epoch
    #[inline(always)]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, zero if the clock went backwards
    #[inline(always)]
    pub fn duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

// ─── Probe ───────────────────────────────────────────────────────────────────

/// Measurement capability consumed by the sampler.
pub trait Probe: Send + Sync {
    /// Current monotonic time. Must never go backwards within a process.
    fn now(&self) -> Timestamp;

    /// Current resident memory of the process in bytes.
    ///
    /// Noisy by nature (allocator caching, paging); callers accept that.
    fn resident_memory(&self) -> u64;
}

// ─── SystemProbe ─────────────────────────────────────────────────────────────

/// Probe backed by the OS: `Instant` for time, RSS for memory.
///
/// On Linux memory is the current resident set from `/proc/self/statm`.
/// Other unix platforms only expose the peak resident set through
/// `getrusage`, so there memory deltas are never negative and stay at zero
/// once the peak is not exceeded. Elsewhere memory reads as 0.
#[derive(Debug)]
pub struct SystemProbe {
    epoch: std::time::Instant,
    page_size: u64,
    warned: AtomicBool,
}

impl SystemProbe {
    /// Create a probe whose epoch is now
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
            page_size: page_size(),
            warned: AtomicBool::new(false),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for SystemProbe {
    #[inline(always)]
    fn now(&self) -> Timestamp {
        let nanos = self.epoch.elapsed().as_nanos();
        Timestamp(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn resident_memory(&self) -> u64 {
        match read_resident_bytes(self.page_size) {
            Ok(bytes) => bytes,
            Err(error) => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(%error, "cannot read resident memory, reporting 0 bytes");
                }
                0
            }
        }
    }
}

#[cfg(unix)]
fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a system constant.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as u64 } else { 4096 }
}

#[cfg(not(unix))]
fn page_size() -> u64 {
    4096
}

/// Resident pages from `/proc/self/statm` (second field).
#[cfg(target_os = "linux")]
fn read_resident_bytes(page_size: u64) -> std::io::Result<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm")?;
    let pages = statm
        .split_whitespace()
        .nth(1)
        .and_then(|field| field.parse::<u64>().ok())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed /proc/self/statm: {statm:?}"),
            )
        })?;
    Ok(pages.saturating_mul(page_size))
}

/// Peak RSS from `getrusage`; the closest portable figure outside Linux.
#[cfg(all(unix, not(target_os = "linux")))]
fn read_resident_bytes(_page_size: u64) -> std::io::Result<u64> {
    use std::mem::MaybeUninit;

    let mut usage = MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage writes a full rusage struct into the provided pointer.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: initialized by the successful call above.
    let usage = unsafe { usage.assume_init() };
    let max_rss = usage.ru_maxrss.max(0) as u64;

    // macOS reports bytes, the BSDs report kilobytes.
    if cfg!(target_os = "macos") {
        Ok(max_rss)
    } else {
        Ok(max_rss.saturating_mul(1024))
    }
}

#[cfg(not(unix))]
fn read_resident_bytes(_page_size: u64) -> std::io::Result<u64> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "resident memory is not available on this platform",
    ))
}

// ─── ManualProbe ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ManualState {
    now_nanos: AtomicU64,
    tick_nanos: AtomicU64,
    resident_bytes: AtomicU64,
}

/// Deterministic probe driven by the caller.
///
/// Clones share state, so a test can hand one clone to the benchmark and move
/// another into its iterate closure to advance the clock or grow memory.
#[derive(Debug, Clone, Default)]
pub struct ManualProbe {
    state: Arc<ManualState>,
}

impl ManualProbe {
    /// Probe frozen at time zero with zero resident memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe whose clock advances by `tick` every time it is read
    pub fn with_tick(tick: Duration) -> Self {
        let probe = Self::new();
        probe.state.tick_nanos.store(duration_nanos(tick), Ordering::SeqCst);
        probe
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.state
            .now_nanos
            .fetch_add(duration_nanos(by), Ordering::SeqCst);
    }

    /// Set the reported resident memory
    pub fn set_resident_memory(&self, bytes: u64) {
        self.state.resident_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Grow the reported resident memory
    pub fn grow(&self, bytes: u64) {
        self.state.resident_bytes.fetch_add(bytes, Ordering::SeqCst);
    }

    /// Shrink the reported resident memory, stopping at zero
    pub fn shrink(&self, bytes: u64) {
        let _ = self
            .state
            .resident_bytes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    /// Read the clock without ticking it
    pub fn peek(&self) -> Timestamp {
        Timestamp(self.state.now_nanos.load(Ordering::SeqCst))
    }
}

impl Probe for ManualProbe {
    fn now(&self) -> Timestamp {
        let tick = self.state.tick_nanos.load(Ordering::SeqCst);
        let previous = self.state.now_nanos.fetch_add(tick, Ordering::SeqCst);
        Timestamp(previous.saturating_add(tick))
    }

    fn resident_memory(&self) -> u64 {
        self.state.resident_bytes.load(Ordering::SeqCst)
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
