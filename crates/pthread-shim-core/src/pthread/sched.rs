//! Scheduler yield.

use crate::error::PthreadError;
use crate::native::{self, NativeError};

/// Give up the rest of the calling thread's quantum.
pub fn sched_yield() -> Result<(), PthreadError> {
    if native::switch_to_thread() {
        Ok(())
    } else {
        Err(NativeError::NoSwitch.into())
    }
}
