//! Trace-driven multi-core MESI cache-coherence simulator library.
//!
//! This crate models private L1 data caches kept coherent by a snooping bus:
//! 1. **Core:** A set-associative cache per core with MESI line states and LRU replacement.
//! 2. **SoC:** The shared interconnect and the coherence engine servicing local reads and writes.
//! 3. **Simulation:** Trace parsing, a deterministic round-robin scheduler, and the run driver.
//! 4. **Reporting:** Per-core and bus statistics, as text or serde-serialized data.
//!
//! # Examples
//!
//! ```
//! use mesisim_core::config::Config;
//! use mesisim_core::sim::trace::parse_trace;
//! use mesisim_core::Simulator;
//!
//! let workload = parse_trace("(1, 10, [100], [])\n(2, 10, [], [100])\n#eof\n").unwrap();
//! let mut config = Config::default();
//! config.system.num_cores = 2;
//! config.schedule.assign(0, vec![1]);
//! config.schedule.assign(1, vec![2]);
//!
//! let mut sim = Simulator::new(&config, workload).unwrap();
//! let stats = sim.run().unwrap();
//! assert_eq!(stats.interconnect.traffic, 2);
//! assert_eq!(stats.cores[0].evictions, 1);
//! ```

/// Common types (address split, access and bus kinds, errors).
pub mod common;
/// Simulator configuration (defaults, JSON surface, validation).
pub mod config;
/// Per-core components (the coherent L1 data cache).
pub mod core;
/// Workload, trace loading, scheduling and the simulator driver.
pub mod sim;
/// System context, interconnect and coherence engine.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Run driver; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Explicit simulation context (caches + bus); construct with `System::new`.
pub use crate::soc::System;
