//! Core-local components.
//!
//! A core owns nothing but its private cache; the instruction stream it would
//! execute is replaced by a recorded memory trace (see [`crate::sim`]).

/// Per-core units (the L1 data cache).
pub mod units;

pub use self::units::cache::CoherentCache;

/// Index of a core, `0..num_cores`.
pub type CoreId = usize;
