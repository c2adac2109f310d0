//! Structured failure tracing.
//!
//! Silent unless `PTHREAD_SHIM_TRACE` is on. Each non-success outcome then
//! becomes one JSON line on stderr:
//!
//! ```text
//! {"timestamp":1760572800123,"level":"debug","event":"pthread_cond_timedwait","errno":110,"outcome":"timeout"}
//! ```
//!
//! Tracing never alters the outcome handed back to the caller.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config;
use crate::error::PthreadError;

/// Severity of a trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Debug,
    Warn,
}

/// Outcome class of a trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceOutcome {
    Timeout,
    Busy,
    Error,
}

/// One JSONL trace record.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub level: TraceLevel,
    /// POSIX operation name, e.g. `pthread_join`.
    pub event: &'static str,
    pub errno: i32,
    pub outcome: TraceOutcome,
}

impl TraceRecord {
    /// Classify `err` as reported by `event`, stamped with the current time.
    #[must_use]
    pub fn from_error(event: &'static str, err: PthreadError) -> Self {
        let outcome = match err {
            PthreadError::TimedOut => TraceOutcome::Timeout,
            PthreadError::Busy => TraceOutcome::Busy,
            _ => TraceOutcome::Error,
        };
        let level = if err.is_expected() {
            TraceLevel::Debug
        } else {
            TraceLevel::Warn
        };
        Self {
            timestamp: now_millis(),
            level,
            event,
            errno: err.errno(),
            outcome,
        }
    }

    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

/// Emit a record for `err` if tracing is enabled.
pub fn record_failure(event: &'static str, err: PthreadError) {
    if !config::config().trace {
        return;
    }
    let line = TraceRecord::from_error(event, err).to_json_line();
    let _ = writeln!(std::io::stderr().lock(), "{line}");
}

/// Pass `result` through unchanged, tracing it when it is an error.
pub fn observe<T>(event: &'static str, result: Result<T, PthreadError>) -> Result<T, PthreadError> {
    if let Err(err) = &result {
        record_failure(event, *err);
    }
    result
}
