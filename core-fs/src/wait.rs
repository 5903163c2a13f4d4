//! Blocking-wait primitive.
//!
//! Turns "completes asynchronously, eventually" into "returns within the op
//! timeout". Both waits monopolize the calling thread until they return;
//! never call them from a thread that must stay responsive, such as a
//! runtime worker.
//!
//! The deadline comes from an [`OpTimeout`] handle. Every session owns one;
//! clones share the value, so [`OpTimeout::set`] affects every wait that
//! has not yet expired as well as all later ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{FsError, IoResult, VoidIoResult};

pub use core_runtime::config::DEFAULT_OP_TIMEOUT;

/// Upper bound on one condvar sleep, so a shortened timeout is noticed.
const RECHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Shared, mutable deadline for blocking waits.
#[derive(Debug, Clone)]
pub struct OpTimeout {
    nanos: Arc<AtomicU64>,
}

impl OpTimeout {
    pub fn new(timeout: Duration) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(to_nanos(timeout))),
        }
    }

    pub fn get(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }

    pub fn set(&self, timeout: Duration) {
        self.nanos.store(to_nanos(timeout), Ordering::Release);
    }

    /// Whether a wait that began at `start` has run out of time.
    fn expired(&self, start: Instant) -> bool {
        start.elapsed() > self.get()
    }

    /// Time left for a wait that began at `start`.
    fn remaining(&self, start: Instant) -> Duration {
        self.get().saturating_sub(start.elapsed())
    }
}

/// Saturates at roughly 584 years.
fn to_nanos(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX)
}

impl Default for OpTimeout {
    fn default() -> Self {
        Self::new(DEFAULT_OP_TIMEOUT)
    }
}

/// Spin until `condition` holds or the timeout passes.
///
/// The condition is evaluated back to back without sleeping; the thread only
/// yields its time slice between checks. CPU-costly by nature.
pub fn sleep_until<F>(timeout: &OpTimeout, mut condition: F) -> VoidIoResult
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while !condition() {
        if timeout.expired(start) {
            return Err(FsError::timeout());
        }
        std::thread::yield_now();
    }
    Ok(())
}

/// Notification that some waited-on state may have changed.
///
/// Writers change their state first and then call [`Signal::notify`];
/// waiters re-run their poll on every notification.
#[derive(Debug, Default)]
pub struct Signal {
    epoch: Mutex<u64>,
    changed: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        *epoch = epoch.wrapping_add(1);
        self.changed.notify_all();
    }
}

/// Block until `poll` yields a value or the timeout passes.
///
/// Same contract as [`sleep_until`] but parks on `signal` between polls
/// instead of spinning. `poll` runs while the signal lock is held, so a
/// notification can never slip in between a failed poll and the park.
pub fn wait_for<T, F>(signal: &Signal, timeout: &OpTimeout, mut poll: F) -> IoResult<T>
where
    F: FnMut() -> Option<T>,
{
    let start = Instant::now();
    let mut epoch = signal.epoch.lock().unwrap_or_else(PoisonError::into_inner);

    loop {
        if let Some(value) = poll() {
            return Ok(value);
        }
        if timeout.expired(start) {
            return Err(FsError::timeout());
        }

        let park = timeout.remaining(start).clamp(Duration::from_micros(100), RECHECK_INTERVAL);
        epoch = signal
            .changed
            .wait_timeout(epoch, park)
            .unwrap_or_else(PoisonError::into_inner)
            .0;
    }
}
