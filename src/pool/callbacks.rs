//! Regular callbacks scheduler (C17): a fixed array of periodic user
//! callbacks invoked in time order, grounded on spec §4.15 / §9
//! ("storing next-time and period inline permits O(N) find-earliest").

pub const MAX: usize = 4;

struct Slot<F> {
    callback: F,
    next_time: i64,
    period: i64,
}

/// Invoking `run` from inside a callback (removing or mutating a slot) is
/// forbidden; guarded by `in_callback`.
pub struct CallbackScheduler<F: FnMut(i64)> {
    slots: Vec<Slot<F>>,
    in_callback: bool,
}

impl<F: FnMut(i64)> CallbackScheduler<F> {
    pub fn new() -> Self {
        Self { slots: Vec::with_capacity(MAX), in_callback: false }
    }

    /// Registers `callback` to run every `period` sample ticks starting no
    /// earlier than `next_time`. `period` must be positive.
    pub fn add(&mut self, callback: F, next_time: i64, period: i64) -> Option<usize> {
        assert!(period > 0, "callback period must be positive");
        if self.slots.len() >= MAX {
            return None;
        }
        self.slots.push(Slot { callback, next_time, period });
        Some(self.slots.len() - 1)
    }

    /// Invokes every callback whose `next_time <= now`, then advances
    /// `next_time += period`. Panics if called re-entrantly from within a
    /// callback.
    pub fn run(&mut self, now: i64) {
        assert!(!self.in_callback, "callback scheduler mutated re-entrantly");
        self.in_callback = true;
        for slot in self.slots.iter_mut() {
            if slot.next_time <= now {
                (slot.callback)(now);
                slot.next_time += slot.period;
                debug_assert!(slot.next_time > now);
            }
        }
        self.in_callback = false;
    }

    /// Earliest `next_time` across all registered slots, `None` if empty.
    pub fn next_time(&self) -> Option<i64> {
        self.slots.iter().map(|s| s.next_time).min()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<F: FnMut(i64)> Default for CallbackScheduler<F> {
    fn default() -> Self {
        Self::new()
    }
}
