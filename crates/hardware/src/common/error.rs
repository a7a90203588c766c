//! Error types.
//!
//! The simulator can fail in exactly three ways, all of them before or outside
//! the coherence model itself:
//! 1. **Load errors:** the trace cannot be read or is malformed ([`TraceError`]).
//! 2. **Configuration errors:** impossible geometry or timing ([`ConfigError`]).
//! 3. **Lookup errors:** the core assignment names a thread that does not exist
//!    ([`ScheduleError`]).
//!
//! Cache and bus operations themselves are infallible: every MESI state has a
//! defined transition for every event.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::CoreId;
use crate::sim::workload::ThreadId;

/// Failure to load a thread trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace source could not be opened or read.
    #[error("could not read trace '{}': {source}", .path.display())]
    Io {
        /// Path of the trace file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading from an in-memory or streamed source failed part way.
    #[error("trace read failed at line {line}: {source}")]
    Read {
        /// 1-based line number being read.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A record does not follow `(tid, count, [reads], [writes])`.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was expected.
        reason: &'static str,
    },

    /// A numeric field could not be parsed.
    #[error("line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// Which field was being parsed.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// Two records carry the same thread id.
    #[error("line {line}: duplicate record for thread {thread}")]
    DuplicateThread {
        /// 1-based line number of the second record.
        line: usize,
        /// The repeated thread id.
        thread: ThreadId,
    },

    /// The input ended before the `#eof` marker.
    #[error("trace ended without an '#eof' marker (truncated capture?)")]
    MissingEof,
}

/// Invalid simulator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config '{}': {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid JSON for [`Config`](crate::config::Config).
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cache geometry cannot be built.
    #[error("invalid cache geometry: {0}")]
    Geometry(&'static str),

    /// A system parameter is out of range.
    #[error("invalid system parameter: {0}")]
    System(&'static str),

    /// The schedule names a core the system does not have.
    #[error("schedule assigns threads to core {core}, but only {num_cores} cores are configured")]
    CoreOutOfRange {
        /// Offending core index.
        core: CoreId,
        /// Configured core count.
        num_cores: usize,
    },
}

/// Inconsistency between the core assignment and the loaded workload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// A core is scheduled to run a thread that has no trace.
    #[error("core {core} is assigned thread {thread}, which has no trace")]
    UnknownThread {
        /// Core holding the assignment.
        core: CoreId,
        /// Thread id without a trace.
        thread: ThreadId,
    },

    /// The same thread is assigned to more than one core.
    #[error("thread {thread} is assigned to both core {first} and core {second}")]
    DuplicateAssignment {
        /// The thread id.
        thread: ThreadId,
        /// First core it was found on.
        first: CoreId,
        /// Second core it was found on.
        second: CoreId,
    },
}

/// Any failure that stops a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Trace load failure.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Core assignment failure.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
