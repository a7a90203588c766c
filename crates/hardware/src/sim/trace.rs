//! Textual thread-trace parser.
//!
//! One record per line, terminated by a line holding exactly `#eof`:
//!
//! ```text
//! (<thread_id>, <instruction_count>, [<r1>, <r2>, ...], [<w1>, ...])
//! #eof
//! ```
//!
//! Addresses are unsigned decimal 64-bit integers and either list may be
//! empty. Surrounding whitespace is ignored, blank lines are skipped and
//! anything after `#eof` is never read.

use std::io::BufRead;

use tracing::debug;

use crate::common::error::TraceError;
use crate::sim::workload::{ThreadTrace, Workload};

/// End-of-trace marker line.
pub const EOF_MARKER: &str = "#eof";

/// Parses a complete trace held in memory.
///
/// # Examples
///
/// ```
/// use mesisim_core::sim::trace::parse_trace;
///
/// let workload = parse_trace("(1, 40, [100, 164], [])\n(2, 7, [], [4096])\n#eof\n").unwrap();
/// assert_eq!(workload.len(), 2);
/// assert_eq!(workload.thread(1).unwrap().pending_reads(), 2);
/// assert_eq!(workload.total_instructions(), 47);
/// ```
pub fn parse_trace(text: &str) -> Result<Workload, TraceError> {
    read_trace(text.as_bytes())
}

/// Reads a trace line by line from `reader`.
///
/// # Errors
///
/// * [`TraceError::Read`] if the reader fails.
/// * [`TraceError::Malformed`] / [`TraceError::InvalidNumber`] for a bad record.
/// * [`TraceError::DuplicateThread`] if a thread id appears twice.
/// * [`TraceError::MissingEof`] if the input ends before `#eof`.
pub fn read_trace<R: BufRead>(reader: R) -> Result<Workload, TraceError> {
    let mut workload = Workload::new();
    for (idx, line) in reader.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.map_err(|source| TraceError::Read {
            line: lineno,
            source,
        })?;
        let record = line.trim();
        if record.is_empty() {
            continue;
        }
        if record == EOF_MARKER {
            debug!(threads = workload.len(), lines = lineno, "trace loaded");
            return Ok(workload);
        }
        workload.insert(parse_record(record, lineno)?, lineno)?;
    }
    Err(TraceError::MissingEof)
}

/// Parses one `(tid, count, [reads], [writes])` record.
pub fn parse_record(record: &str, line: usize) -> Result<ThreadTrace, TraceError> {
    let malformed = |reason: &'static str| TraceError::Malformed { line, reason };

    let body = record
        .trim()
        .strip_prefix('(')
        .ok_or_else(|| malformed("record must start with '('"))?
        .strip_suffix(')')
        .ok_or_else(|| malformed("record must end with ')'"))?;

    let (tid, rest) = body
        .split_once(',')
        .ok_or_else(|| malformed("missing instruction count"))?;
    let (count, rest) = rest
        .split_once(',')
        .ok_or_else(|| malformed("missing address lists"))?;

    let rest = rest
        .trim_start()
        .strip_prefix('[')
        .ok_or_else(|| malformed("read list must start with '['"))?;
    let (reads, rest) = rest
        .split_once(']')
        .ok_or_else(|| malformed("read list is not closed"))?;
    let writes = rest
        .trim_start()
        .strip_prefix(',')
        .ok_or_else(|| malformed("missing write list"))?
        .trim()
        .strip_prefix('[')
        .ok_or_else(|| malformed("write list must start with '['"))?
        .strip_suffix(']')
        .ok_or_else(|| malformed("write list is not closed"))?;
    if writes.contains(['[', ']']) || reads.contains('[') {
        return Err(malformed("unexpected bracket inside address list"));
    }

    Ok(ThreadTrace::new(
        parse_number(tid, line, "thread id")?,
        parse_number(count, line, "instruction count")?,
        parse_list(reads, line, "read address")?,
        parse_list(writes, line, "write address")?,
    ))
}

fn parse_number<T: std::str::FromStr>(
    text: &str,
    line: usize,
    field: &'static str,
) -> Result<T, TraceError> {
    let text = text.trim();
    text.parse().map_err(|_| TraceError::InvalidNumber {
        line,
        field,
        value: text.to_owned(),
    })
}

fn parse_list(body: &str, line: usize, field: &'static str) -> Result<Vec<u64>, TraceError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|item| parse_number(item, line, field))
        .collect()
}
