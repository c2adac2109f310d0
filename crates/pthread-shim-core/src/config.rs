//! Runtime configuration.
//!
//! Read from the environment on first use and cached for the life of the
//! process:
//! - `PTHREAD_SHIM_STACK_SIZE`: stack size for threads created by the shim,
//!   in bytes with an optional `k`/`m` suffix. Unset, `0` or unparsable keeps
//!   the platform default.
//! - `PTHREAD_SHIM_TRACE`: `1`, `true`, `on` or `yes` turns on structured
//!   failure tracing (see [`crate::trace`]). Anything else leaves it off.
//!
//! Parsing never fails; bad values fall back to the defaults. The only
//! configuration the POSIX surface itself accepts is the default thread
//! attributes object.

use std::sync::OnceLock;

pub const STACK_SIZE_ENV: &str = "PTHREAD_SHIM_STACK_SIZE";
pub const TRACE_ENV: &str = "PTHREAD_SHIM_TRACE";

/// Process-wide shim settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShimConfig {
    /// Native stack size for created threads; `None` keeps the platform default.
    pub stack_size: Option<usize>,
    /// Emit one JSON line on stderr per non-success outcome.
    pub trace: bool,
}

impl ShimConfig {
    /// Build a config from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            stack_size: lookup(STACK_SIZE_ENV).and_then(|raw| parse_stack_size(&raw)),
            trace: lookup(TRACE_ENV).is_some_and(|raw| parse_flag_loose(&raw)),
        }
    }

    /// Build a config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Parse a byte count such as `262144`, `256k` or `2M`. Zero means "default".
#[must_use]
pub fn parse_stack_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let (digits, scale) = match raw.as_bytes().last() {
        Some(b'k' | b'K') => (&raw[..raw.len() - 1], 1024),
        Some(b'm' | b'M') => (&raw[..raw.len() - 1], 1024 * 1024),
        _ => (raw, 1),
    };
    digits
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .filter(|&n| n != 0)
}

/// Parse an on/off flag (case-insensitive).
#[must_use]
pub fn parse_flag_loose(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

static CONFIG: OnceLock<ShimConfig> = OnceLock::new();

/// The process-wide configuration, read from the environment on first call.
pub fn config() -> &'static ShimConfig {
    CONFIG.get_or_init(ShimConfig::from_env)
}
