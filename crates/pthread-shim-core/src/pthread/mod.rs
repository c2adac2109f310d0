//! POSIX threading adapters.
//!
//! Each submodule adapts one native primitive family to the POSIX calling
//! convention and error vocabulary:
//!
//! - [`thread`]: create / join / detach / self / equal over [`NativeThread`]
//!   handles, through a trampoline that owns the native entry signature.
//! - [`mutex`]: non-reentrant mutex over [`SlimLock`].
//! - [`cond`]: condition variable over [`ConditionVariable`] with
//!   millisecond-granularity timed waits.
//! - [`tls`]: keys over the native TLS index table, with a destructor run once
//!   at deletion.
//! - [`sched`]: `sched_yield`.
//!
//! [`NativeThread`]: crate::native::NativeThread
//! [`SlimLock`]: crate::native::SlimLock
//! [`ConditionVariable`]: crate::native::ConditionVariable

pub mod cond;
pub mod mutex;
pub mod sched;
pub mod thread;
pub mod tls;

pub use cond::{PthreadCond, PthreadCondAttr, Timespec, timespec_to_millis};
pub use mutex::{
    PthreadMutex, PthreadMutexAttr, mutex_contention_counters, reset_mutex_contention_counters,
};
pub use sched::sched_yield;
pub use thread::{
    Pthread, PthreadAttr, StartRoutine, pthread_create, pthread_detach, pthread_equal,
    pthread_join, pthread_self,
};
pub use tls::{
    Destructor, PTHREAD_KEYS_MAX, PthreadKey, pthread_getspecific, pthread_key_create,
    pthread_key_delete, pthread_setspecific,
};
