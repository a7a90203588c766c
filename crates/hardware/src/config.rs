//! Configuration system for the coherence simulator.
//!
//! This module defines all configuration structures used to parameterize a run.
//! It provides:
//! 1. **Defaults:** The baseline machine (8 cores, 32 KiB 8-way L1-D, 64-byte lines).
//! 2. **Structures:** System timing, per-level cache geometry, and the static
//!    thread-to-core schedule.
//! 3. **Validation:** Geometry and schedule checks performed before any simulation.
//!
//! Configuration is supplied as JSON (every field is optional) or built in code
//! starting from `Config::default()`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::addr::AddressLayout;
use crate::common::error::ConfigError;
use crate::core::CoreId;
use crate::sim::workload::ThreadId;

/// Default configuration constants for the simulator.
mod defaults {
    /// Number of simulated cores.
    pub const NUM_CORES: usize = 8;

    /// Logical ticks charged for a cache hit.
    pub const HIT_LATENCY: u64 = 1;

    /// Logical ticks charged for a cache miss (with or without eviction).
    pub const MISS_PENALTY: u64 = 10;

    /// Logical ticks charged to a peer that held a snooped line.
    pub const SNOOP_LATENCY: u64 = 1;

    /// Default L1 data cache size in bytes (32 KiB).
    pub const L1D_SIZE: usize = 32 * 1024;

    /// Default cache line size in bytes.
    pub const CACHE_LINE: usize = 64;

    /// Default L1 data cache associativity.
    pub const L1D_WAYS: usize = 8;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use mesisim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.system.num_cores, 8);
/// assert_eq!(config.cache.l1_d.size_bytes, 32768);
/// assert_eq!(config.cache.l1_d.geometry().unwrap().num_sets, 64);
/// ```
///
/// Partial JSON documents fall back to defaults field by field:
///
/// ```
/// use mesisim_core::config::Config;
///
/// let json = r#"{
///     "system": { "num_cores": 2, "miss_penalty": 20 },
///     "cache": { "l1_d": { "size_bytes": 4096, "ways": 4 } },
///     "schedule": { "cores": { "0": [2, 6], "1": [1] } }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.system.hit_latency, 1);
/// assert_eq!(config.system.miss_penalty, 20);
/// assert_eq!(config.cache.l1_d.line_bytes, 64);
/// assert_eq!(config.schedule.threads_for(0), &[2, 6]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Core count and timing model
    #[serde(default)]
    pub system: SystemConfig,
    /// Cache hierarchy configuration
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    /// Static thread-to-core assignment
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Parses a configuration from JSON and validates it.
    ///
    /// # Arguments
    ///
    /// * `json` - A JSON document; missing fields take their defaults.
    ///
    /// # Returns
    ///
    /// The validated configuration, or the first parse or validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the configuration describes a machine that can be built.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::System`] for zero cores or zero latencies.
    /// * [`ConfigError::Geometry`] for an impossible L1-D geometry.
    /// * [`ConfigError::CoreOutOfRange`] when the schedule names a missing core.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.system.validate()?;
        let _ = self.cache.l1_d.geometry()?;
        if let Some(&core) = self
            .schedule
            .cores
            .keys()
            .find(|&&core| core >= self.system.num_cores)
        {
            return Err(ConfigError::CoreOutOfRange {
                core,
                num_cores: self.system.num_cores,
            });
        }
        Ok(())
    }
}

/// Core count and logical timing model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Number of cores (one private L1-D each)
    #[serde(default = "SystemConfig::default_num_cores")]
    pub num_cores: usize,

    /// Op-count ticks charged for a hit
    #[serde(default = "SystemConfig::default_hit_latency")]
    pub hit_latency: u64,

    /// Op-count ticks charged for a miss
    #[serde(default = "SystemConfig::default_miss_penalty")]
    pub miss_penalty: u64,

    /// Op-count ticks charged to a peer that held a snooped line
    #[serde(default = "SystemConfig::default_snoop_latency")]
    pub snoop_latency: u64,

    /// Issue a Flush when a Modified victim is evicted locally
    #[serde(default)]
    pub writeback_dirty_victims: bool,
}

impl SystemConfig {
    /// Returns the default core count.
    fn default_num_cores() -> usize {
        defaults::NUM_CORES
    }

    /// Returns the default hit latency.
    fn default_hit_latency() -> u64 {
        defaults::HIT_LATENCY
    }

    /// Returns the default miss penalty.
    fn default_miss_penalty() -> u64 {
        defaults::MISS_PENALTY
    }

    /// Returns the default snoop latency.
    fn default_snoop_latency() -> u64 {
        defaults::SNOOP_LATENCY
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.num_cores == 0 {
            return Err(ConfigError::System("num_cores must be at least 1"));
        }
        // Every local access must move the clock, otherwise LRU stamps stop ordering.
        if self.hit_latency == 0 {
            return Err(ConfigError::System("hit_latency must be at least 1"));
        }
        if self.miss_penalty == 0 {
            return Err(ConfigError::System("miss_penalty must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SystemConfig {
    /// Returns the default system: 8 cores, 1-tick hits, 10-tick misses, no
    /// victim write-back traffic.
    fn default() -> Self {
        Self {
            num_cores: defaults::NUM_CORES,
            hit_latency: defaults::HIT_LATENCY,
            miss_penalty: defaults::MISS_PENALTY,
            snoop_latency: defaults::SNOOP_LATENCY,
            writeback_dirty_victims: false,
        }
    }
}

/// Cache hierarchy configuration.
///
/// Only the private L1 data cache is modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHierarchyConfig {
    /// Per-core L1 data cache
    #[serde(default)]
    pub l1_d: CacheConfig,
}

/// Individual cache level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::L1D_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::L1D_WAYS
    }

    /// Derives and checks the set/way geometry.
    ///
    /// # Returns
    ///
    /// The geometry, or [`ConfigError::Geometry`] if the line size or derived
    /// set count is not a power of two, or the size does not divide into whole
    /// sets.
    pub fn geometry(&self) -> Result<CacheGeometry, ConfigError> {
        if self.ways == 0 {
            return Err(ConfigError::Geometry("ways must be at least 1"));
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::Geometry(
                "line_bytes must be a non-zero power of two",
            ));
        }
        let set_bytes = self
            .line_bytes
            .checked_mul(self.ways)
            .ok_or(ConfigError::Geometry("line_bytes * ways overflows"))?;
        if self.size_bytes == 0 || self.size_bytes % set_bytes != 0 {
            return Err(ConfigError::Geometry(
                "size_bytes must be a non-zero multiple of line_bytes * ways",
            ));
        }
        let num_sets = self.size_bytes / set_bytes;
        let layout = AddressLayout::new(self.line_bytes, num_sets)
            .ok_or(ConfigError::Geometry("number of sets must be a power of two"))?;
        Ok(CacheGeometry {
            num_sets,
            ways: self.ways,
            line_bytes: self.line_bytes,
            layout,
        })
    }
}

impl Default for CacheConfig {
    /// Returns the default L1-D: 32 KiB, 64-byte lines, 8 ways (64 sets).
    fn default() -> Self {
        Self {
            size_bytes: defaults::L1D_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::L1D_WAYS,
        }
    }
}

/// Validated shape of one cache, derived from a [`CacheConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Number of sets.
    pub num_sets: usize,
    /// Ways per set.
    pub ways: usize,
    /// Line size in bytes.
    pub line_bytes: usize,
    /// Address split for this geometry.
    pub layout: AddressLayout,
}

impl CacheGeometry {
    /// Total number of line slots (`num_sets * ways`).
    pub const fn num_lines(&self) -> usize {
        self.num_sets * self.ways
    }
}

/// Static assignment of threads to cores.
///
/// Each core's list is consumed as a stack: the thread at the *end* of the
/// list runs first. Cores absent from the map run nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Core index to ordered thread list
    #[serde(default)]
    pub cores: BTreeMap<CoreId, Vec<ThreadId>>,
}

impl ScheduleConfig {
    /// Returns the threads assigned to `core` (empty if none).
    pub fn threads_for(&self, core: CoreId) -> &[ThreadId] {
        self.cores.get(&core).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replaces the thread list of `core`.
    pub fn assign(&mut self, core: CoreId, threads: Vec<ThreadId>) {
        let _ = self.cores.insert(core, threads);
    }

    /// Returns `true` if no core has any thread assigned.
    pub fn is_empty(&self) -> bool {
        self.cores.values().all(Vec::is_empty)
    }
}

impl FromIterator<(CoreId, Vec<ThreadId>)> for ScheduleConfig {
    fn from_iter<I: IntoIterator<Item = (CoreId, Vec<ThreadId>)>>(iter: I) -> Self {
        Self {
            cores: iter.into_iter().collect(),
        }
    }
}
