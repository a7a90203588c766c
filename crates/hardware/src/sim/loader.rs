//! Trace and configuration loading.
//!
//! This module reads the two inputs of a run from disk. It performs:
//! 1. **Trace loading:** Opens a trace file and parses it into a [`Workload`].
//! 2. **Config loading:** Reads and validates a JSON configuration, or falls back to defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::common::error::{ConfigError, TraceError};
use crate::config::Config;
use crate::sim::trace::read_trace;
use crate::sim::workload::Workload;

/// Loads a thread trace file.
///
/// # Arguments
///
/// * `path` - Path to a trace in the `(tid, count, [reads], [writes])` format.
///
/// # Returns
///
/// The parsed workload, or the first I/O or format error.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Workload, TraceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let workload = read_trace(BufReader::new(file))?;
    info!(
        path = %path.display(),
        threads = workload.len(),
        operations = workload.total_operations(),
        "loaded trace"
    );
    Ok(workload)
}

/// Loads a configuration file, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
