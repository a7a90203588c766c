//! Tests for the simulation driver and its inputs.



/// Round interleaving, stack order and assignment validation.
pub mod scheduler;


/// Trace record parsing.
pub mod trace;

/// Thread trace consumption.
pub mod workload;
