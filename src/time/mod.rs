//! Time (C1): abstract durations over the runtime sample rate.
//!
//! All timestamps are signed 64-bit sample counts at the runtime radio
//! sample rate `R`, with the origin at the first streamed sample.

use crate::error::ConfigError;

/// Earlier than any legal timestamp.
pub const UNDEFINED_EARLY: i64 = i64::MIN / 2;

/// Later than any legal timestamp.
pub const UNDEFINED_LATE: i64 = i64::MAX;

/// Abstract duration unit tag. `Subslot(mu)` requires `mu` in `{1, 2, 4, 8}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Ms,
    S,
    Slot,
    Subslot(u32),
}

impl Unit {
    /// `R / divisor(u)` samples per unit, before invariant checking.
    fn divisor(self) -> Result<u64, ConfigError> {
        match self {
            Unit::Ms => Ok(1000),
            Unit::S => Ok(1),
            Unit::Slot => Ok(2400),
            Unit::Subslot(mu) => {
                debug_assert!(matches!(mu, 1 | 2 | 4 | 8));
                Ok(2400 * mu as u64)
            }
        }
    }
}

/// A duration with a resolved sample count, derived from a `DurationLut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    unit: Unit,
    mult: u32,
    samples: i64,
}

impl Duration {
    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn mult(&self) -> u32 {
        self.mult
    }

    pub fn samples(&self) -> i64 {
        self.samples
    }
}

/// Precomputes `samples(unit) = R / divisor(unit)` for every representable
/// unit at a fixed runtime sample rate.
#[derive(Debug, Clone)]
pub struct DurationLut {
    samp_rate: u64,
    per_sample_unit: [i64; 7],
}

const IDX_MS: usize = 0;
const IDX_S: usize = 1;
const IDX_SLOT: usize = 2;
const IDX_SUB1: usize = 3;
const IDX_SUB2: usize = 4;
const IDX_SUB4: usize = 5;
const IDX_SUB8: usize = 6;

fn unit_index(unit: Unit) -> usize {
    match unit {
        Unit::Ms => IDX_MS,
        Unit::S => IDX_S,
        Unit::Slot => IDX_SLOT,
        Unit::Subslot(1) => IDX_SUB1,
        Unit::Subslot(2) => IDX_SUB2,
        Unit::Subslot(4) => IDX_SUB4,
        Unit::Subslot(8) => IDX_SUB8,
        Unit::Subslot(mu) => panic!("subslot mu {mu} undefined, must be 1|2|4|8"),
    }
}

impl DurationLut {
    pub fn new(samp_rate: u64) -> Result<Self, ConfigError> {
        if samp_rate == 0 {
            return Err(ConfigError::UnitNotRepresentable {
                samp_rate,
                divisor: 0,
            });
        }

        let units = [
            Unit::Ms,
            Unit::S,
            Unit::Slot,
            Unit::Subslot(1),
            Unit::Subslot(2),
            Unit::Subslot(4),
            Unit::Subslot(8),
        ];

        let mut per_sample_unit = [0i64; 7];
        for unit in units {
            let divisor = unit.divisor()?;
            if samp_rate % divisor != 0 {
                return Err(ConfigError::UnitNotRepresentable { samp_rate, divisor });
            }
            per_sample_unit[unit_index(unit)] = (samp_rate / divisor) as i64;
        }

        Ok(Self {
            samp_rate,
            per_sample_unit,
        })
    }

    pub fn samp_rate(&self) -> u64 {
        self.samp_rate
    }

    /// Samples for one unit of `unit`.
    pub fn samples_per_unit(&self, unit: Unit) -> i64 {
        self.per_sample_unit[unit_index(unit)]
    }

    /// Builds a `Duration` of `mult` units of `unit`.
    pub fn duration(&self, unit: Unit, mult: u32) -> Duration {
        Duration {
            unit,
            mult,
            samples: self.samples_per_unit(unit) * mult as i64,
        }
    }

    /// Arbitrary microsecond duration, for settling/turnaround times that
    /// are not guaranteed to divide `R` exactly by a whole-unit ratio.
    pub fn samples_from_us(&self, us: u32) -> i64 {
        (self.samp_rate as i64 * us as i64) / 1_000_000
    }

    pub fn samples_at_last_full_second(&self, t: i64) -> i64 {
        let r = self.samp_rate as i64;
        t - t.rem_euclid(r)
    }

    pub fn samples_at_next_full_second(&self, t: i64) -> i64 {
        let r = self.samp_rate as i64;
        let last = self.samples_at_last_full_second(t);
        if last == t {
            t
        } else {
            last + r
        }
    }

    /// `(n/R)*1e9 + (n mod R)*1e9/R`, split to avoid overflow at large `n`.
    pub fn ns_from_samples(&self, n: i64) -> i64 {
        let r = self.samp_rate as i64;
        let whole_seconds = n.div_euclid(r);
        let remainder = n.rem_euclid(r);
        whole_seconds * 1_000_000_000 + (remainder * 1_000_000_000) / r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_representable_rate() {
        assert!(DurationLut::new(1000).is_err());
    }

    #[test]
    fn accepts_192_ms() {
        let lut = DurationLut::new(1_920_000).unwrap();
        assert_eq!(lut.samples_per_unit(Unit::Ms), 1920);
        assert_eq!(lut.samples_per_unit(Unit::Slot), 800);
        assert_eq!(lut.samples_per_unit(Unit::Subslot(8)), 100);
    }

    #[test]
    fn round_trip_ns_from_samples() {
        let lut = DurationLut::new(1_920_000).unwrap();
        let d = lut.duration(Unit::Ms, 3);
        let ns = lut.ns_from_samples(d.samples());
        assert_eq!(ns, 3 * 1_000_000);
    }

    #[test]
    fn full_second_alignment() {
        let lut = DurationLut::new(1_920_000).unwrap();
        assert_eq!(lut.samples_at_last_full_second(1_920_000 + 5), 1_920_000);
        assert_eq!(lut.samples_at_next_full_second(1_920_000 + 5), 2 * 1_920_000);
        assert_eq!(lut.samples_at_next_full_second(1_920_000), 1_920_000);
    }
}
