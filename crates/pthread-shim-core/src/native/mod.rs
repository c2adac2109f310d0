//! Native primitive vocabulary.
//!
//! The shape of the platform primitives the POSIX layer adapts:
//!
//! - [`SlimLock`]: slim, non-reentrant exclusive lock. Valid all-zero.
//! - [`ConditionVariable`]: sleeps on a held `SlimLock` with a timeout in
//!   milliseconds, [`INFINITE`] meaning no timeout.
//! - [`NativeThread`]: handle-based threads whose entry point has the
//!   fixed `entry(param) -> u32` signature.
//! - [`tls_alloc`] / [`tls_get`] / [`tls_set`] / [`tls_free`]: an index-based
//!   per-thread storage table with fixed capacity.
//! - [`switch_to_thread`]: yield the rest of the quantum.
//!
//! Nothing here speaks POSIX; see [`crate::pthread`] for the adapters.

pub mod condvar;
pub mod lock;
pub mod thread;
pub mod tls;

pub use condvar::{ConditionVariable, INFINITE};
pub use lock::SlimLock;
pub use thread::{NativeThread, ThreadProc, create_thread, switch_to_thread};
pub use tls::{TLS_SLOTS, tls_alloc, tls_free, tls_get, tls_is_allocated, tls_set};

/// Failures reported by the native primitives.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    #[error("thread creation failed: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("thread terminated abnormally")]
    Abandoned,
    #[error("wait timed out")]
    Timeout,
    #[error("no free TLS index")]
    OutOfIndexes,
    #[error("TLS index {0} is not allocated")]
    InvalidIndex(u32),
    #[error("scheduler declined to switch threads")]
    NoSwitch,
}
