//! # Workload Tests
//!
//! Independent front-to-back consumption of reads and writes.

use mesisim_core::common::error::TraceError;
use mesisim_core::sim::workload::{ThreadTrace, Workload};

#[test]
fn reads_and_writes_are_consumed_independently() {
    let mut trace = ThreadTrace::new(3, 10, [1, 2, 3], [7]);
    assert_eq!(trace.next_write(), Some(7));
    assert_eq!(trace.next_write(), None);
    assert!(!trace.is_exhausted());

    assert_eq!(trace.next_read(), Some(1));
    assert_eq!(trace.next_read(), Some(2));
    assert_eq!(trace.pending_reads(), 1);
    assert_eq!(trace.next_read(), Some(3));
    assert!(trace.is_exhausted());
    assert_eq!(trace.next_read(), None);
}

#[test]
fn insert_rejects_duplicate_ids() {
    let mut workload = Workload::new();
    workload.insert(ThreadTrace::new(1, 0, [], [4]), 1).unwrap();
    let err = workload
        .insert(ThreadTrace::new(1, 0, [8], []), 9)
        .unwrap_err();

    assert!(matches!(err, TraceError::DuplicateThread { line: 9, thread: 1 }));
    assert_eq!(workload.thread(1).unwrap().pending_writes(), 1);
    assert_eq!(workload.len(), 1);
}

#[test]
fn drained_once_every_thread_is_exhausted() {
    let mut workload: Workload = [
        ThreadTrace::new(1, 4, [10], []),
        ThreadTrace::new(2, 6, [], []),
    ]
    .into_iter()
    .collect();

    assert!(!workload.is_drained());
    assert!(workload.contains(2));
    assert!(!workload.contains(3));
    assert_eq!(workload.total_instructions(), 10);

    let _ = workload.thread_mut(1).unwrap().next_read();
    assert!(workload.is_drained());
    assert_eq!(workload.total_operations(), 0);
    let ids: Vec<u32> = workload.threads().map(|t| t.id).collect();
    assert_eq!(ids, [1, 2]);
}
