//! Per-core hardware units.
//!
//! Each simulated core is reduced to the one unit that matters for coherence:
//! its private L1 data cache.

/// Coherent L1 data cache with MESI line states and LRU replacement.
pub mod cache;
