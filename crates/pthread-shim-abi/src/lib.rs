// Every extern "C" entry takes raw pointers from C callers and checks them for
// null; the remaining obligations are the POSIX ones, so per-function safety
// docs would repeat the man pages.
#![allow(clippy::missing_safety_doc)]
//! # pthread-shim-abi
//!
//! C-calling-convention POSIX threading surface over `pthread-shim-core`.
//!
//! ```text
//! C caller -> ABI entry (this crate) -> pthread adapters -> native primitives
//! ```
//!
//! Every entry returns the POSIX errno-style `c_int` (`0` on success) except
//! `sched_yield`, which returns `-1` and sets `errno`. Failures are traced as
//! JSON lines when `PTHREAD_SHIM_TRACE` is on.
//!
//! Functions are not exported under their C names: the host libc that `std`
//! runs on already owns `pthread_create` and friends, and interposing them
//! would route `std::thread` through this crate.

pub mod pthread_abi;
pub mod sched_abi;
