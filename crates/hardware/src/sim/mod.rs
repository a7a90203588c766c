//! Simulation driver and its inputs.
//!
//! Provides the workload model, the trace parser and loaders, the core
//! scheduler, the offline assignment planners, and the [`Simulator`] that
//! ties them to a [`System`](crate::soc::System).

/// Thread-to-core assignment planners (greedy, DMDA).
pub mod assign;

/// Trace and configuration file loading.
pub mod loader;

/// Core scheduler (round interleaving of thread traces).
pub mod scheduler;

/// Top-level simulator.
pub mod simulator;

/// Textual trace parser.
pub mod trace;

/// Thread traces and workloads.
pub mod workload;

pub use self::simulator::Simulator;
