//! # pthread-shim-core
//!
//! POSIX threading vocabulary (threads, mutexes, condition variables,
//! thread-specific data, yield) adapted onto a native primitive set that does
//! not speak POSIX: slim exclusive locks, lock-paired condition variables,
//! handle-based threads and index-based thread-local storage.
//!
//! `unsafe` is denied at the crate level. Only the native bindings and the
//! adapters that hand raw pointers across threads opt back in.
//!
//! ```text
//! POSIX caller -> pthread adapters (this crate) -> native primitives -> OS
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod errno;
pub mod error;
#[allow(unsafe_code)]
pub mod native;
#[allow(unsafe_code)]
pub mod pthread;
pub mod trace;

pub use error::PthreadError;
