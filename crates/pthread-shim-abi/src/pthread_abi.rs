//! ABI layer for `<pthread.h>` threads, mutexes, condition variables and
//! thread-specific data.
//!
//! Null object pointers and any non-null attributes pointer are `EINVAL`.
//! Everything else is decided by `pthread_shim_core::pthread`.

#![allow(non_camel_case_types)]

use std::ffi::{c_int, c_void};

use pthread_shim_core::PthreadError;
use pthread_shim_core::pthread::{
    self, Destructor, Pthread, PthreadAttr, PthreadCond, PthreadCondAttr, PthreadKey,
    PthreadMutex, PthreadMutexAttr, StartRoutine, Timespec,
};
use pthread_shim_core::trace;

pub type pthread_t = Pthread;
pub type pthread_attr_t = PthreadAttr;
pub type pthread_mutex_t = PthreadMutex;
pub type pthread_mutexattr_t = PthreadMutexAttr;
pub type pthread_cond_t = PthreadCond;
pub type pthread_condattr_t = PthreadCondAttr;
pub type pthread_key_t = PthreadKey;

#[allow(clippy::declare_interior_mutable_const)]
pub const PTHREAD_MUTEX_INITIALIZER: pthread_mutex_t = PthreadMutex::new();
#[allow(clippy::declare_interior_mutable_const)]
pub const PTHREAD_COND_INITIALIZER: pthread_cond_t = PthreadCond::new();

pub const PTHREAD_KEYS_MAX: usize = pthread::PTHREAD_KEYS_MAX;

#[inline]
fn report(event: &'static str, result: Result<(), PthreadError>) -> c_int {
    match trace::observe(event, result) {
        Ok(()) => 0,
        Err(err) => err.errno(),
    }
}

#[inline]
fn invalid(event: &'static str) -> c_int {
    report(event, Err(PthreadError::InvalidArgument))
}

/// Test hook: zero the process-wide mutex contention counters. Both hooks
/// read zero unless the `contention-counters` feature is enabled.
#[doc(hidden)]
pub fn pthread_mutex_reset_state_for_tests() {
    pthread::reset_mutex_contention_counters();
}

/// Test hook: snapshot `(fast, contended)` mutex acquisition counters.
#[doc(hidden)]
#[must_use]
pub fn pthread_mutex_branch_counters_for_tests() -> (u64, u64) {
    pthread::mutex_contention_counters()
}

// ===========================================================================
// Thread lifecycle
// ===========================================================================

/// POSIX `pthread_self`.
pub extern "C" fn pthread_self() -> pthread_t {
    pthread::pthread_self()
}

/// POSIX `pthread_equal`.
pub extern "C" fn pthread_equal(a: pthread_t, b: pthread_t) -> c_int {
    c_int::from(pthread::pthread_equal(a, b))
}

/// POSIX `pthread_create`.
pub unsafe extern "C" fn pthread_create(
    thread: *mut pthread_t,
    attr: *const pthread_attr_t,
    start_routine: Option<StartRoutine>,
    arg: *mut c_void,
) -> c_int {
    const EVENT: &str = "pthread_create";
    let Some(start_routine) = start_routine else {
        return invalid(EVENT);
    };
    if thread.is_null() {
        return invalid(EVENT);
    }
    // SAFETY: a non-null `attr` points to caller-owned attributes.
    let attr = unsafe { attr.as_ref() };
    // SAFETY: the caller vouches for `start_routine(arg)` on a new thread.
    match unsafe { pthread::pthread_create(attr, start_routine, arg) } {
        Ok(handle) => {
            // SAFETY: `thread` is non-null and points to caller-owned storage.
            unsafe { thread.write(handle) };
            0
        }
        Err(err) => report(EVENT, Err(err)),
    }
}

/// POSIX `pthread_join`. The start routine's result is not kept, so `retval`
/// (when non-null) always receives null.
pub unsafe extern "C" fn pthread_join(thread: pthread_t, retval: *mut *mut c_void) -> c_int {
    let rc = report("pthread_join", pthread::pthread_join(thread));
    if rc == 0 && !retval.is_null() {
        // SAFETY: `retval` is non-null and points to caller-owned storage.
        unsafe { retval.write(std::ptr::null_mut()) };
    }
    rc
}

/// POSIX `pthread_detach`.
pub unsafe extern "C" fn pthread_detach(thread: pthread_t) -> c_int {
    report("pthread_detach", pthread::pthread_detach(thread))
}

// ===========================================================================
// Mutex operations
// ===========================================================================

/// POSIX `pthread_mutex_init`.
pub unsafe extern "C" fn pthread_mutex_init(
    mutex: *mut pthread_mutex_t,
    attr: *const pthread_mutexattr_t,
) -> c_int {
    const EVENT: &str = "pthread_mutex_init";
    // SAFETY: a non-null `mutex` points to caller-owned, unshared storage.
    let Some(mutex) = (unsafe { mutex.as_mut() }) else {
        return invalid(EVENT);
    };
    // SAFETY: a non-null `attr` points to caller-owned attributes.
    let attr = unsafe { attr.as_ref() };
    report(EVENT, mutex.init(attr))
}

/// POSIX `pthread_mutex_destroy`.
pub unsafe extern "C" fn pthread_mutex_destroy(mutex: *mut pthread_mutex_t) -> c_int {
    // SAFETY: a non-null `mutex` points to caller-owned storage.
    match unsafe { mutex.as_mut() } {
        Some(mutex) => report("pthread_mutex_destroy", mutex.destroy()),
        None => invalid("pthread_mutex_destroy"),
    }
}

/// POSIX `pthread_mutex_lock`.
pub unsafe extern "C" fn pthread_mutex_lock(mutex: *mut pthread_mutex_t) -> c_int {
    // SAFETY: a non-null `mutex` points to a live mutex.
    match unsafe { mutex.as_ref() } {
        Some(mutex) => report("pthread_mutex_lock", mutex.lock()),
        None => invalid("pthread_mutex_lock"),
    }
}

/// POSIX `pthread_mutex_trylock`.
pub unsafe extern "C" fn pthread_mutex_trylock(mutex: *mut pthread_mutex_t) -> c_int {
    // SAFETY: a non-null `mutex` points to a live mutex.
    match unsafe { mutex.as_ref() } {
        Some(mutex) => report("pthread_mutex_trylock", mutex.try_lock()),
        None => invalid("pthread_mutex_trylock"),
    }
}

/// POSIX `pthread_mutex_unlock`.
pub unsafe extern "C" fn pthread_mutex_unlock(mutex: *mut pthread_mutex_t) -> c_int {
    // SAFETY: a non-null `mutex` points to a live mutex.
    let Some(mutex) = (unsafe { mutex.as_ref() }) else {
        return invalid("pthread_mutex_unlock");
    };
    // SAFETY: POSIX requires the caller to hold the mutex.
    report("pthread_mutex_unlock", unsafe { mutex.unlock() })
}

// ===========================================================================
// Condition variable operations
// ===========================================================================

/// POSIX `pthread_cond_init`.
pub unsafe extern "C" fn pthread_cond_init(
    cond: *mut pthread_cond_t,
    attr: *const pthread_condattr_t,
) -> c_int {
    const EVENT: &str = "pthread_cond_init";
    // SAFETY: a non-null `cond` points to caller-owned, unshared storage.
    let Some(cond) = (unsafe { cond.as_mut() }) else {
        return invalid(EVENT);
    };
    // SAFETY: a non-null `attr` points to caller-owned attributes.
    let attr = unsafe { attr.as_ref() };
    report(EVENT, cond.init(attr))
}

/// POSIX `pthread_cond_destroy`.
pub unsafe extern "C" fn pthread_cond_destroy(cond: *mut pthread_cond_t) -> c_int {
    // SAFETY: a non-null `cond` points to caller-owned storage.
    match unsafe { cond.as_mut() } {
        Some(cond) => report("pthread_cond_destroy", cond.destroy()),
        None => invalid("pthread_cond_destroy"),
    }
}

/// POSIX `pthread_cond_wait`.
pub unsafe extern "C" fn pthread_cond_wait(
    cond: *mut pthread_cond_t,
    mutex: *mut pthread_mutex_t,
) -> c_int {
    const EVENT: &str = "pthread_cond_wait";
    // SAFETY: non-null pointers refer to live objects.
    let (Some(cond), Some(mutex)) = (unsafe { cond.as_ref() }, unsafe { mutex.as_ref() }) else {
        return invalid(EVENT);
    };
    // SAFETY: POSIX requires the caller to hold `mutex`.
    report(EVENT, unsafe { cond.wait(mutex) })
}

/// `pthread_cond_timedwait` with a *relative* timeout, truncated to whole
/// milliseconds. Returns `ETIMEDOUT` with `mutex` held when it expires.
pub unsafe extern "C" fn pthread_cond_timedwait(
    cond: *mut pthread_cond_t,
    mutex: *mut pthread_mutex_t,
    reltime: *const libc::timespec,
) -> c_int {
    const EVENT: &str = "pthread_cond_timedwait";
    // SAFETY: non-null pointers refer to live objects.
    let (Some(cond), Some(mutex), Some(reltime)) = (
        unsafe { cond.as_ref() },
        unsafe { mutex.as_ref() },
        unsafe { reltime.as_ref() },
    ) else {
        return invalid(EVENT);
    };
    let timeout = Timespec::new(i64::from(reltime.tv_sec), i64::from(reltime.tv_nsec));
    // SAFETY: POSIX requires the caller to hold `mutex`.
    report(EVENT, unsafe { cond.timed_wait(mutex, timeout) })
}

/// POSIX `pthread_cond_signal`.
pub unsafe extern "C" fn pthread_cond_signal(cond: *mut pthread_cond_t) -> c_int {
    // SAFETY: a non-null `cond` points to a live condition variable.
    match unsafe { cond.as_ref() } {
        Some(cond) => report("pthread_cond_signal", cond.signal()),
        None => invalid("pthread_cond_signal"),
    }
}

/// POSIX `pthread_cond_broadcast`.
pub unsafe extern "C" fn pthread_cond_broadcast(cond: *mut pthread_cond_t) -> c_int {
    // SAFETY: a non-null `cond` points to a live condition variable.
    match unsafe { cond.as_ref() } {
        Some(cond) => report("pthread_cond_broadcast", cond.broadcast()),
        None => invalid("pthread_cond_broadcast"),
    }
}

// ===========================================================================
// Thread-specific data
// ===========================================================================

/// POSIX `pthread_key_create`. `EAGAIN` once all `PTHREAD_KEYS_MAX` keys exist.
pub unsafe extern "C" fn pthread_key_create(
    key: *mut pthread_key_t,
    destructor: Option<Destructor>,
) -> c_int {
    const EVENT: &str = "pthread_key_create";
    if key.is_null() {
        return invalid(EVENT);
    }
    match pthread::pthread_key_create(destructor) {
        Ok(created) => {
            // SAFETY: `key` is non-null and points to caller-owned storage.
            unsafe { key.write(created) };
            0
        }
        Err(err) => report(EVENT, Err(err)),
    }
}

/// `pthread_key_delete`, which also runs the key's destructor once with the
/// calling thread's value.
pub unsafe extern "C" fn pthread_key_delete(key: pthread_key_t) -> c_int {
    // SAFETY: the destructor was supplied by the caller at key creation.
    report("pthread_key_delete", unsafe {
        pthread::pthread_key_delete(key)
    })
}

/// POSIX `pthread_getspecific`.
pub extern "C" fn pthread_getspecific(key: pthread_key_t) -> *mut c_void {
    pthread::pthread_getspecific(key)
}

/// POSIX `pthread_setspecific`.
pub unsafe extern "C" fn pthread_setspecific(key: pthread_key_t, value: *const c_void) -> c_int {
    report("pthread_setspecific", pthread::pthread_setspecific(key, value))
}
