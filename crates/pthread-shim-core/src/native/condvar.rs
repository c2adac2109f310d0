//! Condition variable bound to a [`SlimLock`].

use std::fmt;
use std::mem;
use std::time::Duration;

use parking_lot::Condvar;

use super::NativeError;
use super::lock::SlimLock;

/// Timeout value meaning "wait until woken".
pub const INFINITE: u32 = u32::MAX;

/// Native condition variable. No persistent signaled state: a wake with no
/// sleepers is lost.
#[repr(transparent)]
pub struct ConditionVariable {
    inner: Condvar,
}

impl ConditionVariable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Condvar::new(),
        }
    }

    /// Atomically release `lock`, sleep until woken or `timeout_ms` elapses,
    /// then reacquire `lock`. The lock is held again on every return path.
    ///
    /// # Safety
    ///
    /// The calling thread must hold `lock`. The condition variable must not be
    /// slept on concurrently with a different lock.
    pub unsafe fn sleep(&self, lock: &SlimLock, timeout_ms: u32) -> Result<(), NativeError> {
        // SAFETY: the caller holds `lock`; the guard is forgotten again below so
        // ownership stays with the caller.
        let mut guard = unsafe { lock.inner.make_guard_unchecked() };
        let timed_out = if timeout_ms == INFINITE {
            self.inner.wait(&mut guard);
            false
        } else {
            self.inner
                .wait_for(&mut guard, Duration::from_millis(u64::from(timeout_ms)))
                .timed_out()
        };
        mem::forget(guard);
        if timed_out {
            Err(NativeError::Timeout)
        } else {
            Ok(())
        }
    }

    /// Wake at most one sleeper.
    pub fn wake(&self) {
        self.inner.notify_one();
    }

    /// Wake every current sleeper.
    pub fn wake_all(&self) {
        self.inner.notify_all();
    }
}

impl Default for ConditionVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConditionVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionVariable").finish_non_exhaustive()
    }
}
