//! Runtime configuration (ambient stack, SPEC_FULL.md §1): everything a
//! termination point needs at construction, loaded from a directory of
//! config files by an external loader (spec §6 lists the config-file
//! loader itself as out of scope) and handed in as a plain struct here.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::phy::agc::AgcConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Ft,
    Pt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub beacon_period_ms: u32,
    pub after_beacon_ms: u32,
    pub after_now_ms: u32,
    pub turnaround_us: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdcLimits {
    pub packet_length_max: u32,
    pub mcs_index_max: u32,
    pub n_ss_max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PllConfig {
    pub dist_min_accept_s: u32,
    pub dist_min_s: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub role: Role,
    pub sample_rate_hz: u64,
    pub network_id: u32,
    pub nof_antennas_tx: usize,
    pub nof_antennas_rx: usize,
    pub allocation: AllocationConfig,
    pub rdc: RdcLimits,
    pub pll: PllConfig,
    pub agc_tx: AgcConfig,
    pub agc_rx: AgcConfig,
    pub n_worker: usize,
    pub telemetry_path: Option<String>,
}

/// Worker-pool size to fall back to when `n_worker` isn't pinned by the
/// caller's config file, one per available core.
pub fn default_worker_count() -> usize {
    num_cpus::get()
}

impl RuntimeConfig {
    /// Cross-field validation beyond what individual component constructors
    /// already enforce; components still validate their own invariants
    /// (e.g. `DurationLut::new` rejects a non-representable sample rate).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::UnitNotRepresentable { samp_rate: 0, divisor: 1 });
        }
        if self.pll.dist_min_accept_s == 0 || self.pll.dist_min_s % self.pll.dist_min_accept_s != 0 {
            return Err(ConfigError::UnitNotRepresentable {
                samp_rate: self.pll.dist_min_s as u64,
                divisor: self.pll.dist_min_accept_s as u64,
            });
        }
        Ok(())
    }
}
