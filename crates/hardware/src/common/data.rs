//! Access and bus transaction kinds.
//!
//! This module defines the two vocabularies the coherence model is built from:
//! 1. **Processor side:** [`AccessType`], what a core asks of its own cache.
//! 2. **Bus side:** [`BusOp`], what a cache broadcasts to its peers.

use std::fmt;

use serde::Serialize;

/// Type of a core-local memory access taken from a thread trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AccessType {
    /// Data read (load).
    Read,

    /// Data write (store).
    Write,
}

/// Snooping bus transaction.
///
/// Every transaction is one bus message: it costs exactly one unit of
/// interconnect traffic no matter how many peers react to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BusOp {
    /// Read request issued on a read miss.
    ///
    /// Peers holding the block downgrade to Shared; a Modified holder also
    /// flushes.
    BusRd,

    /// Read-for-ownership issued on a write miss or a write to a Shared line.
    ///
    /// Peers holding the block invalidate it; a Modified holder also flushes.
    BusRdX,

    /// Write-back of a Modified line.
    ///
    /// Changes no peer state; it only accounts for the traffic.
    Flush,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

impl fmt::Display for BusOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusRd => write!(f, "BusRd"),
            Self::BusRdX => write!(f, "BusRdX"),
            Self::Flush => write!(f, "Flush"),
        }
    }
}
