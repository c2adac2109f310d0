//! Thread-specific data keys.
//!
//! A key is a native TLS index plus an optional destructor. Unlike POSIX
//! thread-exit destructors, the destructor here runs exactly once, at
//! [`pthread_key_delete`], with the deleting thread's value (null when that
//! thread never stored one). Values other threads stored are dropped silently.

use std::ffi::c_void;

use crate::error::PthreadError;
use crate::native;

pub type Destructor = unsafe extern "C" fn(*mut c_void);

/// Maximum number of keys that can exist at once.
pub const PTHREAD_KEYS_MAX: usize = native::TLS_SLOTS;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PthreadKey {
    index: u32,
    destructor: Option<Destructor>,
}

impl PthreadKey {
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl Default for PthreadKey {
    /// A key that refers to no allocated index.
    fn default() -> Self {
        Self {
            index: u32::MAX,
            destructor: None,
        }
    }
}

/// Allocate a key. `Again` when every index is in use.
pub fn pthread_key_create(destructor: Option<Destructor>) -> Result<PthreadKey, PthreadError> {
    let index = native::tls_alloc()?;
    Ok(PthreadKey { index, destructor })
}

/// Run the key's destructor once with this thread's value, then release the
/// index. A key whose index is not allocated is `InvalidArgument` and its
/// destructor is not called.
///
/// # Safety
///
/// The destructor must be safe to call with this thread's value, including
/// null.
pub unsafe fn pthread_key_delete(key: PthreadKey) -> Result<(), PthreadError> {
    if !native::tls_is_allocated(key.index) {
        return Err(PthreadError::InvalidArgument);
    }
    if let Some(destructor) = key.destructor {
        let value = native::tls_get(key.index) as *mut c_void;
        // SAFETY: forwarded caller contract.
        unsafe { destructor(value) };
    }
    native::tls_free(key.index)?;
    Ok(())
}

/// The calling thread's value for `key`, or null.
pub fn pthread_getspecific(key: PthreadKey) -> *mut c_void {
    native::tls_get(key.index) as *mut c_void
}

pub fn pthread_setspecific(key: PthreadKey, value: *const c_void) -> Result<(), PthreadError> {
    native::tls_set(key.index, value as usize)?;
    Ok(())
}
