//! Error number definitions.
//!
//! Linux numbering for every code the adapters can report, plus the
//! thread-local `errno` cell written by calls that signal failure with `-1`.

use std::cell::Cell;

thread_local! {
    static ERRNO: Cell<i32> = const { Cell::new(0) };
}

pub const ESRCH: i32 = 3;
pub const EIO: i32 = 5;
pub const EAGAIN: i32 = 11;
pub const ENOMEM: i32 = 12;
pub const EBUSY: i32 = 16;
pub const EINVAL: i32 = 22;
pub const EDEADLK: i32 = 35;
pub const ETIMEDOUT: i32 = 110;

/// Returns the current thread-local errno value.
pub fn get_errno() -> i32 {
    ERRNO.get()
}

/// Sets the current thread-local errno value.
pub fn set_errno(value: i32) {
    ERRNO.set(value);
}
