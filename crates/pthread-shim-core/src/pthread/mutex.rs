//! Non-reentrant mutex.
//!
//! A thin adapter over [`SlimLock`]: no owner tracking, no recursion, no heap.
//! Relocking from the holding thread deadlocks, exactly as the native lock
//! does. Valid in its all-zero state.
//!
//! With the `contention-counters` feature, `lock` also counts fast and
//! contended acquisitions process-wide. Without it the counters read zero.

#[cfg(feature = "contention-counters")]
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::PthreadError;
use crate::native::SlimLock;

#[cfg(feature = "contention-counters")]
static MUTEX_FAST_ACQUIRES: AtomicU64 = AtomicU64::new(0);
#[cfg(feature = "contention-counters")]
static MUTEX_CONTENDED_ACQUIRES: AtomicU64 = AtomicU64::new(0);

#[repr(C)]
#[derive(Debug, Default)]
pub struct PthreadMutex {
    lock: SlimLock,
}

/// Mutex attributes. Only the absent form is supported.
#[repr(C)]
#[derive(Debug, Default)]
pub struct PthreadMutexAttr {
    _private: [u8; 0],
}

impl PthreadMutex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock: SlimLock::new(),
        }
    }

    /// Reset to the unlocked state.
    pub fn init(&mut self, attr: Option<&PthreadMutexAttr>) -> Result<(), PthreadError> {
        if attr.is_some() {
            return Err(PthreadError::InvalidArgument);
        }
        *self = Self::new();
        Ok(())
    }

    /// Block until the caller holds the mutex.
    pub fn lock(&self) -> Result<(), PthreadError> {
        #[cfg(feature = "contention-counters")]
        {
            if self.lock.try_acquire_exclusive() {
                MUTEX_FAST_ACQUIRES.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            MUTEX_CONTENDED_ACQUIRES.fetch_add(1, Ordering::Relaxed);
        }
        self.lock.acquire_exclusive();
        Ok(())
    }

    /// Take the mutex without blocking; `Busy` if it is held.
    pub fn try_lock(&self) -> Result<(), PthreadError> {
        if self.lock.try_acquire_exclusive() {
            Ok(())
        } else {
            Err(PthreadError::Busy)
        }
    }

    /// # Safety
    ///
    /// The calling thread must hold the mutex.
    pub unsafe fn unlock(&self) -> Result<(), PthreadError> {
        // SAFETY: forwarded caller contract.
        unsafe { self.lock.release_exclusive() };
        Ok(())
    }

    /// No resources to release.
    pub fn destroy(&mut self) -> Result<(), PthreadError> {
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub(crate) fn native(&self) -> &SlimLock {
        &self.lock
    }
}

/// `(fast, contended)` acquisition counts across every mutex in the process.
#[cfg(feature = "contention-counters")]
pub fn mutex_contention_counters() -> (u64, u64) {
    (
        MUTEX_FAST_ACQUIRES.load(Ordering::Relaxed),
        MUTEX_CONTENDED_ACQUIRES.load(Ordering::Relaxed),
    )
}

#[cfg(not(feature = "contention-counters"))]
pub fn mutex_contention_counters() -> (u64, u64) {
    (0, 0)
}

pub fn reset_mutex_contention_counters() {
    #[cfg(feature = "contention-counters")]
    {
        MUTEX_FAST_ACQUIRES.store(0, Ordering::Relaxed);
        MUTEX_CONTENDED_ACQUIRES.store(0, Ordering::Relaxed);
    }
}
