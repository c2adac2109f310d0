#![cfg(target_os = "linux")]

use std::cell::UnsafeCell;
use std::ffi::c_void;
use std::mem::MaybeUninit;
use std::ptr;
use std::time::{Duration, Instant};

use pthread_shim_abi::pthread_abi::{
    PTHREAD_COND_INITIALIZER, PTHREAD_MUTEX_INITIALIZER, pthread_cond_broadcast,
    pthread_cond_destroy, pthread_cond_init, pthread_cond_signal, pthread_cond_t,
    pthread_cond_timedwait, pthread_cond_wait, pthread_condattr_t, pthread_create, pthread_join,
    pthread_mutex_lock, pthread_mutex_t, pthread_mutex_trylock, pthread_mutex_unlock, pthread_t,
};
use pthread_shim_core::errno;

struct Handshake {
    mutex: UnsafeCell<pthread_mutex_t>,
    cond: UnsafeCell<pthread_cond_t>,
    ready: UnsafeCell<bool>,
    waiting: UnsafeCell<u32>,
    woken: UnsafeCell<u32>,
}

// SAFETY: the plain fields are only touched while `mutex` is held.
unsafe impl Sync for Handshake {}

impl Handshake {
    fn new() -> Self {
        Self {
            mutex: UnsafeCell::new(PTHREAD_MUTEX_INITIALIZER),
            cond: UnsafeCell::new(PTHREAD_COND_INITIALIZER),
            ready: UnsafeCell::new(false),
            waiting: UnsafeCell::new(0),
            woken: UnsafeCell::new(0),
        }
    }

    fn arg(&self) -> *mut c_void {
        self as *const Self as *mut c_void
    }

    fn locked<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        unsafe {
            assert_eq!(pthread_mutex_lock(self.mutex.get()), 0);
            let out = f(self);
            assert_eq!(pthread_mutex_unlock(self.mutex.get()), 0);
            out
        }
    }

    /// Spin until `count` threads are parked in `wait_until_ready`.
    fn await_waiters(&self, count: u32) {
        let start = Instant::now();
        while self.locked(|s| unsafe { *s.waiting.get() }) < count {
            assert!(start.elapsed() < Duration::from_secs(5), "waiters never arrived");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

unsafe extern "C" fn wait_until_ready(arg: *mut c_void) -> *mut c_void {
    // SAFETY: `arg` points at the test's `Handshake`, alive until join.
    let hs = unsafe { &*(arg as *const Handshake) };
    unsafe {
        pthread_mutex_lock(hs.mutex.get());
        *hs.waiting.get() += 1;
        while !*hs.ready.get() {
            pthread_cond_wait(hs.cond.get(), hs.mutex.get());
        }
        // The mutex is held again after every wakeup.
        if pthread_mutex_trylock(hs.mutex.get()) == errno::EBUSY {
            *hs.woken.get() += 1;
        }
        pthread_mutex_unlock(hs.mutex.get());
    }
    ptr::null_mut()
}

fn spawn(arg: *mut c_void) -> pthread_t {
    let mut thread = MaybeUninit::<pthread_t>::uninit();
    unsafe {
        assert_eq!(
            pthread_create(thread.as_mut_ptr(), ptr::null(), Some(wait_until_ready), arg),
            0
        );
        thread.assume_init()
    }
}

fn join(thread: pthread_t) {
    unsafe {
        assert_eq!(pthread_join(thread, ptr::null_mut()), 0);
    }
}

#[test]
fn flag_handshake_wakes_waiter_with_mutex_held() {
    let hs = Handshake::new();
    let thread = spawn(hs.arg());
    hs.await_waiters(1);
    hs.locked(|s| unsafe {
        *s.ready.get() = true;
        assert_eq!(pthread_cond_signal(s.cond.get()), 0);
    });
    join(thread);
    assert_eq!(unsafe { *hs.woken.get() }, 1);
}

#[test]
fn broadcast_wakes_every_waiter() {
    const WAITERS: u32 = 4;
    let hs = Handshake::new();
    let threads: Vec<pthread_t> = (0..WAITERS).map(|_| spawn(hs.arg())).collect();
    hs.await_waiters(WAITERS);
    hs.locked(|s| unsafe {
        *s.ready.get() = true;
        assert_eq!(pthread_cond_broadcast(s.cond.get()), 0);
    });
    for thread in threads {
        join(thread);
    }
    assert_eq!(unsafe { *hs.woken.get() }, WAITERS);
}

#[test]
fn zero_timeout_expires_promptly_with_mutex_held() {
    let mut mutex = PTHREAD_MUTEX_INITIALIZER;
    let mut cond = PTHREAD_COND_INITIALIZER;
    let zero = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        assert_eq!(pthread_mutex_lock(&mut mutex), 0);
        let start = Instant::now();
        assert_eq!(
            pthread_cond_timedwait(&mut cond, &mut mutex, &zero),
            errno::ETIMEDOUT
        );
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(pthread_mutex_trylock(&mut mutex), errno::EBUSY);
        assert_eq!(pthread_mutex_unlock(&mut mutex), 0);
    }
}

#[test]
fn sub_millisecond_timeout_truncates_to_zero() {
    let mut mutex = PTHREAD_MUTEX_INITIALIZER;
    let mut cond = PTHREAD_COND_INITIALIZER;
    let almost_one_ms = libc::timespec {
        tv_sec: 0,
        tv_nsec: 999_999,
    };
    unsafe {
        assert_eq!(pthread_mutex_lock(&mut mutex), 0);
        assert_eq!(
            pthread_cond_timedwait(&mut cond, &mut mutex, &almost_one_ms),
            errno::ETIMEDOUT
        );
        assert_eq!(pthread_mutex_unlock(&mut mutex), 0);
    }
}

#[test]
fn short_timeout_waits_roughly_that_long() {
    let mut mutex = PTHREAD_MUTEX_INITIALIZER;
    let mut cond = PTHREAD_COND_INITIALIZER;
    let fifty_ms = libc::timespec {
        tv_sec: 0,
        tv_nsec: 50_000_000,
    };
    unsafe {
        assert_eq!(pthread_mutex_lock(&mut mutex), 0);
        let start = Instant::now();
        let rc = pthread_cond_timedwait(&mut cond, &mut mutex, &fifty_ms);
        // Spurious wakeups may end the wait early with 0.
        if rc == errno::ETIMEDOUT {
            assert!(start.elapsed() >= Duration::from_millis(40));
        } else {
            assert_eq!(rc, 0);
        }
        assert_eq!(pthread_mutex_unlock(&mut mutex), 0);
    }
}

#[test]
fn out_of_range_nanoseconds_are_invalid() {
    let mut mutex = PTHREAD_MUTEX_INITIALIZER;
    let mut cond = PTHREAD_COND_INITIALIZER;
    let bad = libc::timespec {
        tv_sec: 1,
        tv_nsec: 1_000_000_000,
    };
    unsafe {
        assert_eq!(pthread_mutex_lock(&mut mutex), 0);
        assert_eq!(
            pthread_cond_timedwait(&mut cond, &mut mutex, &bad),
            errno::EINVAL
        );
        assert_eq!(pthread_mutex_trylock(&mut mutex), errno::EBUSY);
        assert_eq!(pthread_mutex_unlock(&mut mutex), 0);
    }
}

#[test]
fn signal_without_waiters_is_not_remembered() {
    let mut mutex = PTHREAD_MUTEX_INITIALIZER;
    let mut cond = PTHREAD_COND_INITIALIZER;
    let ten_ms = libc::timespec {
        tv_sec: 0,
        tv_nsec: 10_000_000,
    };
    unsafe {
        assert_eq!(pthread_cond_signal(&mut cond), 0);
        assert_eq!(pthread_cond_broadcast(&mut cond), 0);
        assert_eq!(pthread_mutex_lock(&mut mutex), 0);
        let rc = pthread_cond_timedwait(&mut cond, &mut mutex, &ten_ms);
        assert!(rc == errno::ETIMEDOUT || rc == 0, "unexpected rc {rc}");
        assert_eq!(pthread_mutex_unlock(&mut mutex), 0);
    }
}

unsafe extern "C" fn timed_wait_for_ready(arg: *mut c_void) -> *mut c_void {
    // SAFETY: `arg` points at the test's `Handshake`, alive until join.
    let hs = unsafe { &*(arg as *const Handshake) };
    let long = libc::timespec {
        tv_sec: 30,
        tv_nsec: 0,
    };
    unsafe {
        pthread_mutex_lock(hs.mutex.get());
        *hs.waiting.get() += 1;
        while !*hs.ready.get() {
            if pthread_cond_timedwait(hs.cond.get(), hs.mutex.get(), &long) == 0 {
                *hs.woken.get() += 1;
            }
        }
        pthread_mutex_unlock(hs.mutex.get());
    }
    ptr::null_mut()
}

#[test]
fn timed_wait_returns_zero_when_signaled() {
    let hs = Handshake::new();
    let mut thread = MaybeUninit::<pthread_t>::uninit();
    unsafe {
        assert_eq!(
            pthread_create(
                thread.as_mut_ptr(),
                ptr::null(),
                Some(timed_wait_for_ready),
                hs.arg()
            ),
            0
        );
    }
    hs.await_waiters(1);
    let start = Instant::now();
    hs.locked(|s| unsafe {
        *s.ready.get() = true;
        assert_eq!(pthread_cond_signal(s.cond.get()), 0);
    });
    join(unsafe { thread.assume_init() });
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(unsafe { *hs.woken.get() } >= 1);
}

#[test]
fn init_and_destroy() {
    let mut cond = PTHREAD_COND_INITIALIZER;
    let attr = pthread_condattr_t::default();
    unsafe {
        assert_eq!(pthread_cond_init(&mut cond, &attr), errno::EINVAL);
        assert_eq!(pthread_cond_init(&mut cond, ptr::null()), 0);
        assert_eq!(pthread_cond_destroy(&mut cond), 0);
    }
}
