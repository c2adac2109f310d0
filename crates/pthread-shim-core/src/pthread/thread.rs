//! Thread lifecycle.
//!
//! A [`Pthread`] is a process-unique identity. The native handle behind it
//! lives in a registry keyed by that identity and is removed by exactly one
//! join or detach. Threads not created here (the main thread, threads spawned
//! by `std`) get an identity lazily from [`pthread_self`]; they have no
//! registry entry, so joining or detaching them reports `ESRCH`.

use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config;
use crate::error::PthreadError;
use crate::native::{self, NativeThread};

/// POSIX start routine: one argument in, a pointer-sized result out.
pub type StartRoutine = unsafe extern "C" fn(*mut c_void) -> *mut c_void;

/// Opaque thread handle.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pthread(u64);

impl Pthread {
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// Thread attributes. Only the absent form is supported, so this type has no
/// state and any supplied instance is rejected.
#[repr(C)]
#[derive(Debug, Default)]
pub struct PthreadAttr {
    _private: [u8; 0],
}

// -----------------------------------------------------------------------------
// Identity and registry
// -----------------------------------------------------------------------------

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SELF_ID: Cell<u64> = const { Cell::new(0) };
}

fn fresh_thread_id() -> u64 {
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

fn thread_table() -> &'static Mutex<HashMap<Pthread, NativeThread>> {
    static TABLE: OnceLock<Mutex<HashMap<Pthread, NativeThread>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

// -----------------------------------------------------------------------------
// Trampoline
// -----------------------------------------------------------------------------

struct StartPackage {
    start: StartRoutine,
    arg: *mut c_void,
    id: u64,
}

/// Native entry point for every thread created by [`pthread_create`].
///
/// Takes ownership of the boxed [`StartPackage`], publishes the thread's
/// identity, runs the start routine and discards its result.
unsafe extern "system" fn thread_proxy(param: *mut c_void) -> u32 {
    // SAFETY: `param` is the `Box<StartPackage>` leaked by `pthread_create`,
    // handed to exactly this thread.
    let package = unsafe { Box::from_raw(param.cast::<StartPackage>()) };
    SELF_ID.with(|id| id.set(package.id));
    // SAFETY: the creator vouched for `start(arg)` when calling `pthread_create`.
    let _ = unsafe { (package.start)(package.arg) };
    0
}

// -----------------------------------------------------------------------------
// Operations
// -----------------------------------------------------------------------------

/// Start a thread running `start(arg)`.
///
/// Any attributes object is rejected with `EINVAL`. A native creation failure
/// reports `EAGAIN` or the native error code, and the start routine never runs.
///
/// # Safety
///
/// `start` must be safe to call with `arg` on another thread, and `arg` must
/// stay valid for as long as `start` uses it.
pub unsafe fn pthread_create(
    attr: Option<&PthreadAttr>,
    start: StartRoutine,
    arg: *mut c_void,
) -> Result<Pthread, PthreadError> {
    if attr.is_some() {
        return Err(PthreadError::InvalidArgument);
    }
    // SAFETY: forwarded from the caller.
    unsafe { create_with_stack(config::config().stack_size, start, arg) }
}

/// # Safety
///
/// Same contract as [`pthread_create`].
unsafe fn create_with_stack(
    stack_size: Option<usize>,
    start: StartRoutine,
    arg: *mut c_void,
) -> Result<Pthread, PthreadError> {
    let handle = Pthread(fresh_thread_id());
    let package = Box::into_raw(Box::new(StartPackage {
        start,
        arg,
        id: handle.0,
    }));

    // Held across the spawn so the new thread cannot observe its own handle
    // before it is registered.
    let mut table = thread_table().lock();
    // SAFETY: `package` is a valid leaked box consumed by `thread_proxy`.
    let spawned = unsafe { native::create_thread(stack_size, thread_proxy, package.cast()) };
    match spawned {
        Ok(native_thread) => {
            table.insert(handle, native_thread);
            Ok(handle)
        }
        Err(err) => {
            // SAFETY: the thread never started, so the package was not consumed.
            drop(unsafe { Box::from_raw(package) });
            Err(err.into())
        }
    }
}

/// Handle of the calling thread.
pub fn pthread_self() -> Pthread {
    SELF_ID.with(|id| {
        if id.get() == 0 {
            id.set(fresh_thread_id());
        }
        Pthread(id.get())
    })
}

#[must_use]
pub fn pthread_equal(a: Pthread, b: Pthread) -> bool {
    a == b
}

/// Wait for `thread` to finish. Its start routine's result is not retrievable.
pub fn pthread_join(thread: Pthread) -> Result<(), PthreadError> {
    if thread == pthread_self() {
        return Err(PthreadError::Deadlock);
    }
    let native_thread = thread_table()
        .lock()
        .remove(&thread)
        .ok_or(PthreadError::NoSuchThread)?;
    native_thread.wait()?;
    Ok(())
}

/// Release `thread`'s handle without waiting for it.
pub fn pthread_detach(thread: Pthread) -> Result<(), PthreadError> {
    thread_table()
        .lock()
        .remove(&thread)
        .ok_or(PthreadError::NoSuchThread)?
        .close();
    Ok(())
}
