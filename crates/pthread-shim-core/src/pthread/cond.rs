//! Condition variables.
//!
//! Timed waits take a relative `(sec, nsec)` duration and are converted to
//! whole milliseconds for the native sleep, truncating rather than rounding:
//! a wait shorter than one millisecond is a zero wait and times out at once.

use crate::error::PthreadError;
use crate::native::{ConditionVariable, INFINITE};
use crate::pthread::mutex::PthreadMutex;

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Relative wait duration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timespec {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

impl Timespec {
    #[must_use]
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Self {
        Self { tv_sec, tv_nsec }
    }
}

/// Convert a relative duration to native milliseconds:
/// `sec * 1000 + nsec / 1_000_000`.
///
/// `nsec` outside `0..1_000_000_000` is `InvalidArgument`. Negative seconds
/// count as zero. Results past the finite native range saturate to the
/// longest finite wait and never become [`INFINITE`].
pub const fn timespec_to_millis(ts: Timespec) -> Result<u32, PthreadError> {
    if ts.tv_nsec < 0 || ts.tv_nsec >= NANOS_PER_SEC {
        return Err(PthreadError::InvalidArgument);
    }
    let sec = if ts.tv_sec < 0 { 0 } else { ts.tv_sec };
    let millis = sec
        .saturating_mul(1000)
        .saturating_add(ts.tv_nsec / NANOS_PER_MILLI);
    let max_finite = (INFINITE - 1) as i64;
    if millis > max_finite {
        Ok(INFINITE - 1)
    } else {
        Ok(millis as u32)
    }
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct PthreadCond {
    cv: ConditionVariable,
}

/// Condition variable attributes. Only the absent form is supported.
#[repr(C)]
#[derive(Debug, Default)]
pub struct PthreadCondAttr {
    _private: [u8; 0],
}

impl PthreadCond {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cv: ConditionVariable::new(),
        }
    }

    pub fn init(&mut self, attr: Option<&PthreadCondAttr>) -> Result<(), PthreadError> {
        if attr.is_some() {
            return Err(PthreadError::InvalidArgument);
        }
        *self = Self::new();
        Ok(())
    }

    /// Release `mutex`, sleep until woken, reacquire `mutex`. Wakeups may be
    /// spurious.
    ///
    /// # Safety
    ///
    /// The caller must hold `mutex`, and must not wait on this condition
    /// variable with a different mutex while other waiters are using `mutex`.
    pub unsafe fn wait(&self, mutex: &PthreadMutex) -> Result<(), PthreadError> {
        // SAFETY: forwarded caller contract.
        unsafe { self.cv.sleep(mutex.native(), INFINITE) }?;
        Ok(())
    }

    /// Like [`wait`](Self::wait), bounded by `timeout`. `TimedOut` when it
    /// expires; `mutex` is held again either way.
    ///
    /// # Safety
    ///
    /// Same contract as [`wait`](Self::wait).
    pub unsafe fn timed_wait(
        &self,
        mutex: &PthreadMutex,
        timeout: Timespec,
    ) -> Result<(), PthreadError> {
        let millis = timespec_to_millis(timeout)?;
        // SAFETY: forwarded caller contract.
        unsafe { self.cv.sleep(mutex.native(), millis) }?;
        Ok(())
    }

    /// Wake at most one waiter.
    pub fn signal(&self) -> Result<(), PthreadError> {
        self.cv.wake();
        Ok(())
    }

    /// Wake every current waiter.
    pub fn broadcast(&self) -> Result<(), PthreadError> {
        self.cv.wake_all();
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<(), PthreadError> {
        Ok(())
    }
}
