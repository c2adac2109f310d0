//! POSIX outcome vocabulary shared by every adapter.
//!
//! Each variant maps 1:1 onto an errno value through [`PthreadError::errno`].
//! Timeouts and contention are variants like any other so callers can tell
//! them apart from real failures without a second channel.

use crate::errno;
use crate::native::NativeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PthreadError {
    /// A supplied argument or attributes object is not supported.
    #[error("invalid argument")]
    InvalidArgument,
    /// The native layer is out of threads or TLS indexes.
    #[error("resource temporarily unavailable")]
    Again,
    /// The mutex is held; returned by `try_lock` instead of blocking.
    #[error("resource busy")]
    Busy,
    /// A timed wait expired before a wakeup.
    #[error("timed out")]
    TimedOut,
    /// The handle was never created here, or was already joined or detached.
    #[error("no such thread")]
    NoSuchThread,
    /// A thread attempted to join itself.
    #[error("resource deadlock would occur")]
    Deadlock,
    /// Native failure passed through with its errno value, e.g. a thread
    /// creation error other than `EAGAIN`.
    #[error("os error {0}")]
    Os(i32),
}

impl PthreadError {
    /// The errno value reported at the C boundary.
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::InvalidArgument => errno::EINVAL,
            Self::Again => errno::EAGAIN,
            Self::Busy => errno::EBUSY,
            Self::TimedOut => errno::ETIMEDOUT,
            Self::NoSuchThread => errno::ESRCH,
            Self::Deadlock => errno::EDEADLK,
            Self::Os(code) => code,
        }
    }

    /// True for outcomes that are part of normal operation rather than
    /// failures of the primitive: an expired timed wait or a busy `try_lock`.
    #[must_use]
    pub const fn is_expected(self) -> bool {
        matches!(self, Self::Busy | Self::TimedOut)
    }
}

impl From<NativeError> for PthreadError {
    fn from(err: NativeError) -> Self {
        match err {
            NativeError::Spawn(io) => match io.raw_os_error() {
                Some(code) if code != errno::EAGAIN && code > 0 => Self::Os(code),
                _ => Self::Again,
            },
            NativeError::OutOfIndexes | NativeError::NoSwitch => Self::Again,
            NativeError::Abandoned => Self::Os(errno::EIO),
            NativeError::Timeout => Self::TimedOut,
            NativeError::InvalidIndex(_) => Self::InvalidArgument,
        }
    }
}
