//! System-level components.
//!
//! This module organizes the parts of the simulated machine that span cores:
//! the shared bus, the coherence engine that drives it, and the builder that
//! assembles caches and bus into a [`System`].

/// System construction and the top-level `System` context.
pub mod builder;

/// Local read/write handling under the MESI protocol.
pub mod coherence;

/// Shared snooping bus.
pub mod interconnect;

pub use builder::System;
pub use coherence::{AccessKind, AccessOutcome};
pub use interconnect::Interconnect;
