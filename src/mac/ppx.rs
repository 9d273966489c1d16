//! PPX (C7): periodic pulse aligned to the beacon raster, grounded on
//! `mac/ppx/ppx.cpp`.

use crate::error::SyncError;

#[derive(Debug, Clone, Copy)]
pub struct PpxConfig {
    pub period: i64,
    pub length: i64,
    pub time_advance: i64,
    pub time_deviation_max: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Ppx {
    config: PpxConfig,
    period_warped: i64,
    rising_edge_estimation: i64,
}

/// Displacement of `t` from the nearest raster point anchored at `reference`,
/// in `[-raster/2, raster/2]`. `raster` must be even.
pub fn round_offset(reference: i64, raster: i64, t: i64) -> i64 {
    debug_assert!(raster % 2 == 0, "raster must be even");
    let delta = (t - reference).rem_euclid(raster);
    if delta > raster / 2 {
        delta - raster
    } else {
        delta
    }
}

impl Ppx {
    pub fn new(config: PpxConfig) -> Self {
        Self {
            config,
            period_warped: config.period,
            rising_edge_estimation: 0,
        }
    }

    pub fn set_ppx_rising_edge(&mut self, t: i64) {
        self.rising_edge_estimation = t;
    }

    pub fn set_period_warped(&mut self, period_warped: i64) {
        self.period_warped = period_warped;
    }

    pub fn extrapolate_next_rising_edge(&mut self) -> i64 {
        self.rising_edge_estimation += self.period_warped;
        self.rising_edge_estimation
    }

    pub fn rising_edge_estimation(&self) -> i64 {
        self.rising_edge_estimation
    }

    /// Corrects the estimation from an observed beacon time at `beacon_period`
    /// raster spacing; fails with `SyncLost` if the deviation is too large.
    pub fn provide_beacon_time(&mut self, t: i64, beacon_period: i64) -> Result<(), SyncError> {
        let deviation = round_offset(self.rising_edge_estimation, beacon_period, t);
        if deviation.abs() > self.config.time_deviation_max {
            return Err(SyncError::SyncLost {
                deviation,
                max: self.config.time_deviation_max,
            });
        }
        self.rising_edge_estimation += deviation;
        Ok(())
    }

    /// Accepts a beacon whose raster period differs from the configured PPX
    /// period (Open Question in spec §9: implemented as "track", i.e. the
    /// same correction as `provide_beacon_time` but against the supplied
    /// `raster` instead of the configured period).
    pub fn provide_beacon_time_out_of_raster(
        &mut self,
        t: i64,
        raster: i64,
    ) -> Result<(), SyncError> {
        self.provide_beacon_time(t, raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_offset_within_half_raster() {
        assert_eq!(round_offset(0, 100, 5), 5);
        assert_eq!(round_offset(0, 100, 95), -5);
        assert_eq!(round_offset(0, 100, 50), 50);
    }

    #[test]
    fn sync_lost_on_large_deviation() {
        let mut ppx = Ppx::new(PpxConfig {
            period: 1000,
            length: 10,
            time_advance: 0,
            time_deviation_max: 5,
        });
        ppx.set_ppx_rising_edge(0);
        assert!(ppx.provide_beacon_time(1000, 1000).is_ok());
        assert!(ppx.provide_beacon_time(1020, 1000).is_err());
    }
}
