//! Handle-based native threads.
//!
//! Entry points use the native fixed-width convention: one untyped parameter
//! in, a `u32` exit status out.

use std::ffi::c_void;
use std::thread::{self, JoinHandle};

use super::NativeError;

/// Native thread entry point.
pub type ThreadProc = unsafe extern "system" fn(*mut c_void) -> u32;

/// Owned handle to a running or finished native thread.
#[derive(Debug)]
pub struct NativeThread {
    handle: JoinHandle<u32>,
}

/// Start a thread running `entry(param)`.
///
/// `stack_size` of `None` keeps the platform default.
///
/// # Safety
///
/// `param` must be valid for whatever `entry` does with it, from another
/// thread, for as long as `entry` uses it.
pub unsafe fn create_thread(
    stack_size: Option<usize>,
    entry: ThreadProc,
    param: *mut c_void,
) -> Result<NativeThread, NativeError> {
    // Raw pointers are not `Send`; the address crosses as an integer.
    let param = param as usize;
    let mut builder = thread::Builder::new();
    if let Some(size) = stack_size {
        builder = builder.stack_size(size);
    }
    let handle = builder.spawn(move || {
        // SAFETY: guaranteed by the caller of `create_thread`.
        unsafe { entry(param as *mut c_void) }
    })?;
    Ok(NativeThread { handle })
}

impl NativeThread {
    /// Block until the thread finishes and return its exit status.
    pub fn wait(self) -> Result<u32, NativeError> {
        self.handle.join().map_err(|_| NativeError::Abandoned)
    }

    /// Give up the handle; the thread keeps running and cleans up on exit.
    pub fn close(self) {
        drop(self.handle);
    }
}

/// Offer the rest of the caller's quantum to another ready thread.
/// Returns whether the scheduler accepted.
#[cfg(unix)]
pub fn switch_to_thread() -> bool {
    // SAFETY: `sched_yield` takes no arguments and touches no caller memory.
    unsafe { libc::sched_yield() == 0 }
}

#[cfg(not(unix))]
pub fn switch_to_thread() -> bool {
    thread::yield_now();
    true
}
