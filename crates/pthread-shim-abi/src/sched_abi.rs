//! ABI layer for `<sched.h>`.

use std::ffi::c_int;

use pthread_shim_core::{errno, pthread, trace};

/// POSIX `sched_yield`. `0` when the scheduler accepted, otherwise `-1` with
/// `errno` set.
pub extern "C" fn sched_yield() -> c_int {
    match trace::observe("sched_yield", pthread::sched_yield()) {
        Ok(()) => 0,
        Err(err) => {
            errno::set_errno(err.errno());
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yield_returns_zero() {
        errno::set_errno(0);
        assert_eq!(sched_yield(), 0);
        assert_eq!(errno::get_errno(), 0);
    }
}
