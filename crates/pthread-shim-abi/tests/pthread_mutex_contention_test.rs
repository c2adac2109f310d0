//! Mutex acquisition counters. Built only with `contention-counters`.

#![cfg(target_os = "linux")]

use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use pthread_shim_abi::pthread_abi::{
    PTHREAD_MUTEX_INITIALIZER, pthread_mutex_branch_counters_for_tests, pthread_mutex_destroy,
    pthread_mutex_init, pthread_mutex_lock, pthread_mutex_reset_state_for_tests,
    pthread_mutex_t, pthread_mutex_unlock,
};

static TEST_GUARD_HELD: AtomicBool = AtomicBool::new(false);

struct TestGuard;

impl Drop for TestGuard {
    fn drop(&mut self) {
        TEST_GUARD_HELD.store(false, Ordering::Release);
    }
}

fn acquire_test_guard() -> TestGuard {
    loop {
        if TEST_GUARD_HELD
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return TestGuard;
        }
        std::thread::yield_now();
    }
}

fn alloc_mutex_ptr() -> *mut pthread_mutex_t {
    let boxed: Box<pthread_mutex_t> = Box::new(unsafe { std::mem::zeroed() });
    Box::into_raw(boxed)
}

unsafe fn free_mutex_ptr(ptr: *mut pthread_mutex_t) {
    // SAFETY: pointer was allocated with Box::into_raw in alloc_mutex_ptr.
    unsafe { drop(Box::from_raw(ptr)) };
}

fn wait_for_counter_increase(label: &str, before: (u64, u64), timeout: Duration) -> (u64, u64) {
    let start = std::time::Instant::now();
    loop {
        let now = pthread_mutex_branch_counters_for_tests();
        if now.1 > before.1 {
            return now;
        }
        if start.elapsed() > timeout {
            panic!(
                "timeout waiting for counter increase ({label}): before={before:?} now={now:?}"
            );
        }
        std::thread::yield_now();
    }
}

#[test]
fn contention_increments_contended_counter() {
    let _guard = acquire_test_guard();
    pthread_mutex_reset_state_for_tests();

    let mutex = alloc_mutex_ptr();
    unsafe {
        assert_eq!(pthread_mutex_init(mutex, ptr::null()), 0);
        assert_eq!(pthread_mutex_lock(mutex), 0);
    }

    let before = pthread_mutex_branch_counters_for_tests();
    let barrier = Arc::new(Barrier::new(2));
    let barrier_worker = Arc::clone(&barrier);
    let mutex_addr = mutex as usize;

    let handle = std::thread::spawn(move || {
        barrier_worker.wait();
        unsafe {
            assert_eq!(pthread_mutex_lock(mutex_addr as *mut pthread_mutex_t), 0);
            assert_eq!(pthread_mutex_unlock(mutex_addr as *mut pthread_mutex_t), 0);
        }
    });

    barrier.wait();
    let after = wait_for_counter_increase("contended lock", before, Duration::from_secs(5));
    assert!(after.1 > before.1);

    unsafe {
        assert_eq!(pthread_mutex_unlock(mutex), 0);
    }
    handle.join().unwrap();
    unsafe {
        assert_eq!(pthread_mutex_destroy(mutex), 0);
        free_mutex_ptr(mutex);
    }
}

#[test]
fn reset_zeroes_counters() {
    let _guard = acquire_test_guard();
    let mut mutex = PTHREAD_MUTEX_INITIALIZER;
    unsafe {
        assert_eq!(pthread_mutex_lock(&mut mutex), 0);
        assert_eq!(pthread_mutex_unlock(&mut mutex), 0);
    }
    assert!(pthread_mutex_branch_counters_for_tests().0 > 0);
    pthread_mutex_reset_state_for_tests();
    assert_eq!(pthread_mutex_branch_counters_for_tests(), (0, 0));
}
