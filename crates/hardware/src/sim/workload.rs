//! Thread traces and the workload they form.
//!
//! A thread trace is the recorded memory behaviour of one hardware thread:
//! its pending reads and its pending writes, each consumed strictly in order
//! and independently of the other.

use std::collections::{BTreeMap, VecDeque};

use crate::common::error::TraceError;

/// Identifier of a traced thread, as it appears in the trace file.
pub type ThreadId = u32;

/// Pending memory operations of one thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadTrace {
    /// Thread id.
    pub id: ThreadId,
    /// Instructions the thread retired while being traced.
    pub instruction_count: u64,
    reads: VecDeque<u64>,
    writes: VecDeque<u64>,
}

impl ThreadTrace {
    /// Creates a trace from its read and write address sequences.
    pub fn new(
        id: ThreadId,
        instruction_count: u64,
        reads: impl IntoIterator<Item = u64>,
        writes: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self {
            id,
            instruction_count,
            reads: reads.into_iter().collect(),
            writes: writes.into_iter().collect(),
        }
    }

    /// Removes and returns the next pending read address.
    #[inline]
    pub fn next_read(&mut self) -> Option<u64> {
        self.reads.pop_front()
    }

    /// Removes and returns the next pending write address.
    #[inline]
    pub fn next_write(&mut self) -> Option<u64> {
        self.writes.pop_front()
    }

    /// Reads not yet executed.
    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }

    /// Writes not yet executed.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Peeks at the pending reads, front first.
    pub fn reads(&self) -> impl Iterator<Item = u64> + '_ {
        self.reads.iter().copied()
    }

    /// Peeks at the pending writes, front first.
    pub fn writes(&self) -> impl Iterator<Item = u64> + '_ {
        self.writes.iter().copied()
    }

    /// Returns `true` once both sequences are empty.
    pub fn is_exhausted(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }
}

/// Every loaded thread trace, keyed by thread id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Workload {
    threads: BTreeMap<ThreadId, ThreadTrace>,
}

impl Workload {
    /// Creates an empty workload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a thread.
    ///
    /// # Errors
    ///
    /// [`TraceError::DuplicateThread`] (reported at `line`) if the id is
    /// already present; the workload is left unchanged.
    pub fn insert(&mut self, trace: ThreadTrace, line: usize) -> Result<(), TraceError> {
        if self.threads.contains_key(&trace.id) {
            return Err(TraceError::DuplicateThread {
                line,
                thread: trace.id,
            });
        }
        let _ = self.threads.insert(trace.id, trace);
        Ok(())
    }

    /// Looks up a thread.
    pub fn thread(&self, id: ThreadId) -> Option<&ThreadTrace> {
        self.threads.get(&id)
    }

    /// Looks up a thread for consumption.
    pub fn thread_mut(&mut self, id: ThreadId) -> Option<&mut ThreadTrace> {
        self.threads.get_mut(&id)
    }

    /// Returns `true` if a thread with this id was loaded.
    pub fn contains(&self, id: ThreadId) -> bool {
        self.threads.contains_key(&id)
    }

    /// Iterates over the threads in id order.
    pub fn threads(&self) -> impl Iterator<Item = &ThreadTrace> {
        self.threads.values()
    }

    /// Number of threads.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// Returns `true` if no thread was loaded.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Returns `true` once every thread is exhausted.
    pub fn is_drained(&self) -> bool {
        self.threads.values().all(ThreadTrace::is_exhausted)
    }

    /// Sum of the recorded instruction counts.
    pub fn total_instructions(&self) -> u64 {
        self.threads.values().map(|t| t.instruction_count).sum()
    }

    /// Pending reads plus writes over all threads.
    pub fn total_operations(&self) -> usize {
        self.threads
            .values()
            .map(|t| t.pending_reads() + t.pending_writes())
            .sum()
    }
}

impl FromIterator<ThreadTrace> for Workload {
    /// Collects traces; a later trace with a repeated id replaces the earlier one.
    fn from_iter<I: IntoIterator<Item = ThreadTrace>>(iter: I) -> Self {
        Self {
            threads: iter.into_iter().map(|t| (t.id, t)).collect(),
        }
    }
}
