//! Resource (C5): a non-overlapping UL/DL sub-interval within a beacon
//! period, grounded on `mac/allocation/resource.cpp`'s sample-index algebra.

use crate::time::Duration;

/// `(offset, length)` pair. `length >= 1 sample`; `offset + length - 1` must
/// be inside the owning beacon period (checked by `Allocation::add_resource`).
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub offset: Duration,
    pub length: Duration,
}

impl Resource {
    pub fn new(offset: Duration, length: Duration) -> Self {
        Self { offset, length }
    }

    pub fn first_sample_index(&self) -> i64 {
        self.offset.samples()
    }

    pub fn last_sample_index(&self) -> i64 {
        self.offset.samples() + self.length.samples() - 1
    }

    pub fn is_positive_length(&self) -> bool {
        self.length.samples() >= 1
    }

    pub fn is_causal(&self) -> bool {
        self.first_sample_index() <= self.last_sample_index()
    }

    pub fn is_well_defined(&self) -> bool {
        self.is_positive_length() && self.is_causal()
    }

    pub fn is_within_beacon_period(&self, beacon_period_samples: i64) -> bool {
        self.offset.samples() >= 0 && self.last_sample_index() < beacon_period_samples
    }

    /// Two resources are orthogonal if their sample-index ranges do not
    /// intersect (`resource.cpp::is_orthogonal`).
    pub fn is_orthogonal(&self, other: &Resource) -> bool {
        other.last_sample_index() < self.first_sample_index()
            || self.last_sample_index() < other.first_sample_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{DurationLut, Unit};

    #[test]
    fn orthogonality() {
        let lut = DurationLut::new(1_920_000).unwrap();
        let a = Resource::new(lut.duration(Unit::Ms, 0), lut.duration(Unit::Ms, 1));
        let b = Resource::new(lut.duration(Unit::Ms, 1), lut.duration(Unit::Ms, 1));
        assert!(a.is_orthogonal(&b));

        let c = Resource::new(lut.duration(Unit::Ms, 0), lut.duration(Unit::Ms, 2));
        assert!(!a.is_orthogonal(&c));
    }

    #[test]
    fn within_beacon_period() {
        let lut = DurationLut::new(1_920_000).unwrap();
        let beacon_period = lut.duration(Unit::Ms, 10);
        let r = Resource::new(lut.duration(Unit::Ms, 9), lut.duration(Unit::Ms, 2));
        assert!(!r.is_within_beacon_period(beacon_period.samples()));
        let r2 = Resource::new(lut.duration(Unit::Ms, 9), lut.duration(Unit::Ms, 1));
        assert!(r2.is_within_beacon_period(beacon_period.samples()));
    }
}
