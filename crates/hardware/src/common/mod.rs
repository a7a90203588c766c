//! Common types shared by every part of the simulator.
//!
//! This module provides:
//! 1. **Address Decomposition:** Offset/set/tag split for the configured geometry.
//! 2. **Access Kinds:** Processor accesses and bus transaction kinds.
//! 3. **Error Handling:** Load, configuration, and lookup errors.

/// Address decomposition (offset, set index, tag).
pub mod addr;

/// Processor access and bus operation kinds.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{AddressLayout, LineAddr};
pub use data::{AccessType, BusOp};
pub use error::{ConfigError, ScheduleError, SimError, TraceError};
