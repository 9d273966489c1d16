//! PLL (C6): estimates the frequency-scaling factor between local and
//! remote time bases from beacon arrivals, grounded on `mac/pll/pll.cpp`.

use crate::common::Ema;
use crate::time::UNDEFINED_EARLY;

pub const DIST_MIN_ACCEPT: i64 = 1_920_000; // 1 s at 1.92 MS/s reference rate, in samples
pub const EMA_ALPHA: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct Pll {
    ring: Vec<i64>,
    idx: usize,
    dist_min_accept: i64,
    dist_min: i64,
    dist_max: i64,
    warp_factor: Ema,
    beacon_time_last_known: i64,
}

impl Pll {
    /// `dist_min_accept` and `dist_min` define the ring-buffer capacity
    /// `dist_min / dist_min_accept`; `beacon_period` and the 8-beacon-period
    /// margin define `dist_max` per spec §4.5.
    pub fn new(dist_min_accept: i64, dist_min: i64, beacon_period: i64) -> Self {
        assert!(dist_min_accept > 0 && dist_min % dist_min_accept == 0);
        assert!(dist_min_accept < dist_min);
        let dist_max = dist_min + 8 * beacon_period;
        let capacity = (dist_min / dist_min_accept) as usize;
        Self {
            ring: vec![UNDEFINED_EARLY; capacity],
            idx: 0,
            dist_min_accept,
            dist_min,
            dist_max,
            warp_factor: Ema::new(1.0, EMA_ALPHA),
            beacon_time_last_known: UNDEFINED_EARLY,
        }
    }

    fn next_idx(&self) -> usize {
        (self.idx + 1) % self.ring.len()
    }

    pub fn factor(&self) -> f64 {
        self.warp_factor.get()
    }

    pub fn get_warped(&self, x: i64) -> i64 {
        (x as f64 * self.factor()).round() as i64
    }

    /// Implements the steps of spec §4.5 `provide_beacon_time`.
    pub fn provide_beacon_time(&mut self, t: i64, beacon_period: i64) {
        if t - self.beacon_time_last_known < self.dist_min_accept {
            return;
        }

        self.ring[self.idx] = t;
        self.beacon_time_last_known = t;

        if self.ring[self.next_idx()] <= UNDEFINED_EARLY {
            self.idx = self.next_idx();
            return;
        }

        let oldest = self.ring[self.next_idx()];
        let d = t - oldest;
        if d > self.dist_max {
            self.idx = self.next_idx();
            return;
        }

        self.idx = self.next_idx();

        let k = ((d as f64) / (beacon_period as f64)).round() as i64;
        if k == 0 {
            return;
        }
        let factor = d as f64 / (k * beacon_period) as f64;
        debug_assert!((factor - 1.0).abs() < 150e-6, "drift exceeds 150 ppm");
        self.warp_factor.update(factor);
    }

    pub fn reset(&mut self) {
        for slot in self.ring.iter_mut() {
            *slot = UNDEFINED_EARLY;
        }
        self.idx = 0;
        self.warp_factor.set(1.0);
        self.beacon_time_last_known = UNDEFINED_EARLY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spec §8 scenario S4: feed beacons spaced `1s + k samples` apart at
    /// R=1.92 MS/s; drift factor converges towards `1 + 1/R`.
    #[test]
    fn s4_pll_converges() {
        let r: i64 = 1_920_000;
        let beacon_period = r / 100; // 10 ms
        let dist_min_accept = r; // 1 s
        let dist_min = 5 * r; // 5 s
        let mut pll = Pll::new(dist_min_accept, dist_min, beacon_period);

        let mut t: i64 = 0;
        for k in 0..40 {
            pll.provide_beacon_time(t, beacon_period);
            t += r + k + 1;
        }

        let expected = 1.0 + 1.0 / r as f64;
        assert!(
            (pll.factor() - expected).abs() < 5e-6,
            "factor {} not close to {}",
            pll.factor(),
            expected
        );
    }

    #[test]
    fn rejects_too_close_beacons() {
        let mut pll = Pll::new(1000, 5000, 100);
        pll.provide_beacon_time(0, 100);
        pll.provide_beacon_time(500, 100); // too close, ignored
        assert_eq!(pll.beacon_time_last_known, 0);
    }
}
