//! Construction of the simulated machine and the top-level `System` type.
//!
//! This module builds the whole coherent memory system from configuration. It performs:
//! 1. **Geometry:** Validates the L1-D configuration and derives sets, ways and address split.
//! 2. **Caches:** Instantiates one cold private cache per core.
//! 3. **Bus:** Creates the shared interconnect with the configured snoop latency.

use tracing::debug;

use crate::common::addr::AddressLayout;
use crate::common::error::ConfigError;
use crate::config::Config;
use crate::core::{CoherentCache, CoreId};
use crate::soc::interconnect::Interconnect;
use crate::stats::{CoreStats, InterconnectStats};

/// Explicit simulation context: every cache and the bus.
///
/// All coherence state lives here and is mutated through `&mut self`; there is
/// no global state.
#[derive(Clone, Debug)]
pub struct System {
    pub(crate) caches: Vec<CoherentCache>,
    pub(crate) interconnect: Interconnect,
    pub(crate) hit_latency: u64,
    pub(crate) miss_penalty: u64,
    pub(crate) writeback_dirty_victims: bool,
}

impl System {
    /// Builds a cold system from configuration.
    ///
    /// Only the system and cache sections are consulted; the schedule is the
    /// concern of [`Scheduler`](crate::sim::scheduler::Scheduler).
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration.
    ///
    /// # Returns
    ///
    /// A system with `num_cores` empty caches and an idle bus, or the
    /// geometry/system error that prevents building it.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let sys = &config.system;
        if sys.num_cores == 0 {
            return Err(ConfigError::System("num_cores must be at least 1"));
        }
        if sys.hit_latency == 0 || sys.miss_penalty == 0 {
            return Err(ConfigError::System("latencies must be at least 1"));
        }
        let geometry = config.cache.l1_d.geometry()?;
        debug!(
            cores = sys.num_cores,
            sets = geometry.num_sets,
            ways = geometry.ways,
            line_bytes = geometry.line_bytes,
            "building system"
        );

        Ok(Self {
            caches: vec![CoherentCache::new(geometry); sys.num_cores],
            interconnect: Interconnect::new(sys.snoop_latency),
            hit_latency: sys.hit_latency,
            miss_penalty: sys.miss_penalty,
            writeback_dirty_victims: sys.writeback_dirty_victims,
        })
    }

    /// Number of cores.
    pub fn num_cores(&self) -> usize {
        self.caches.len()
    }

    /// Address split shared by every cache.
    pub fn layout(&self) -> &AddressLayout {
        // `new` guarantees at least one core.
        self.caches[0].layout()
    }

    /// The cache of `core`, if it exists.
    pub fn cache(&self, core: CoreId) -> Option<&CoherentCache> {
        self.caches.get(core)
    }

    /// All caches in core order.
    pub fn caches(&self) -> &[CoherentCache] {
        &self.caches
    }

    /// The shared bus.
    pub const fn interconnect(&self) -> &Interconnect {
        &self.interconnect
    }

    /// Snapshot of every core's counters.
    pub fn core_stats(&self) -> Vec<CoreStats> {
        self.caches.iter().map(|c| c.stats).collect()
    }

    /// Bus counters.
    pub const fn interconnect_stats(&self) -> &InterconnectStats {
        self.interconnect.stats()
    }
}
