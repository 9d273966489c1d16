//! Irregular-callback heap (C15): bounded, lock-protected min-heap of
//! future timed callbacks, grounded on spec §4.14.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;

use crate::error::ConfigError;
use crate::time::UNDEFINED_LATE;

pub const MAX: usize = 8;

/// An irregular callback requested by a MAC callback's return value, keyed
/// by an opaque handle for future cancellation/coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrregularReport {
    pub handle: u32,
    pub time: i64,
}

impl PartialOrd for IrregularReport {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for IrregularReport {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // BinaryHeap is a max-heap; reverse so the earliest time sorts first.
        other.time.cmp(&self.time)
    }
}

struct Inner {
    heap: BinaryHeap<IrregularReport>,
}

/// Fixed capacity `MAX=8`. All operations hold the internal lock; the
/// earliest time is mirrored in an atomic for lock-free polling from the
/// synchronizer thread.
pub struct IrregularHeap {
    inner: Mutex<Inner>,
    next_time: AtomicI64,
}

impl IrregularHeap {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { heap: BinaryHeap::with_capacity(MAX) }),
            next_time: AtomicI64::new(UNDEFINED_LATE),
        }
    }

    pub fn push(&self, report: IrregularReport) -> Result<(), ConfigError> {
        let mut inner = self.inner.lock();
        if inner.heap.len() >= MAX {
            return Err(ConfigError::IrregularOverflow { capacity: MAX });
        }
        inner.heap.push(report);
        self.refresh_next_time(&inner);
        Ok(())
    }

    pub fn pop(&self) -> Option<IrregularReport> {
        let mut inner = self.inner.lock();
        let report = inner.heap.pop();
        self.refresh_next_time(&inner);
        report
    }

    fn refresh_next_time(&self, inner: &Inner) {
        let next = inner.heap.peek().map(|r| r.time).unwrap_or(UNDEFINED_LATE);
        self.next_time.store(next, Ordering::Release);
    }

    /// Lock-free read of the earliest pending time, `UNDEFINED_LATE` if empty.
    pub fn get_next_time(&self) -> i64 {
        self.next_time.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IrregularHeap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_returns_earliest_first() {
        let heap = IrregularHeap::new();
        heap.push(IrregularReport { handle: 1, time: 300 }).unwrap();
        heap.push(IrregularReport { handle: 2, time: 100 }).unwrap();
        heap.push(IrregularReport { handle: 3, time: 200 }).unwrap();

        assert_eq!(heap.get_next_time(), 100);
        assert_eq!(heap.pop().unwrap().handle, 2);
        assert_eq!(heap.get_next_time(), 200);
        assert_eq!(heap.pop().unwrap().handle, 3);
        assert_eq!(heap.pop().unwrap().handle, 1);
        assert_eq!(heap.get_next_time(), UNDEFINED_LATE);
    }

    #[test]
    fn overflow_when_capacity_exceeded() {
        let heap = IrregularHeap::new();
        for i in 0..MAX {
            heap.push(IrregularReport { handle: i as u32, time: i as i64 }).unwrap();
        }
        let err = heap.push(IrregularReport { handle: 99, time: 99 });
        assert!(matches!(err, Err(ConfigError::IrregularOverflow { capacity: MAX })));
    }
}
