//! Slim exclusive lock.
//!
//! One byte of state, no heap allocation, no owner tracking. The guard-less
//! interface matches the native acquire/release pair: acquiring forgets the
//! `parking_lot` guard and releasing force-unlocks.

use std::fmt;
use std::mem;

use parking_lot::Mutex;

/// Non-reentrant exclusive lock. Acquiring it twice from the same thread
/// deadlocks.
#[repr(transparent)]
pub struct SlimLock {
    pub(super) inner: Mutex<()>,
}

impl SlimLock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: parking_lot::const_mutex(()),
        }
    }

    /// Block until the lock is held by the caller.
    pub fn acquire_exclusive(&self) {
        mem::forget(self.inner.lock());
    }

    /// Take the lock if it is free. Never blocks.
    pub fn try_acquire_exclusive(&self) -> bool {
        self.inner.try_lock().map(mem::forget).is_some()
    }

    /// Release the lock.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock.
    pub unsafe fn release_exclusive(&self) {
        // SAFETY: the caller holds the lock and its guard was forgotten at acquisition.
        unsafe { self.inner.force_unlock() };
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

impl Default for SlimLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SlimLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlimLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}
