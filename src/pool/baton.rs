//! FIFO baton (C14, half): a mutual-exclusion token with both a strict
//! FIFO-ordered mode (for jobs from the synchronizer) and a plain
//! non-ordered mode (for out-of-order completions like PDC/channel-scan),
//! grounded on spec §4.13 / §9 ("implement with an atomic counter backed by
//! a condition variable for the blocking path").

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Per-termination-point baton. `id` distinguishes batons when a firmware
/// runs several termination points (spec does not require more than one in
/// this core, but the identity is threaded through to match the contract).
pub struct Baton {
    id: usize,
    fifo_counter: Mutex<u64>,
    fifo_cvar: Condvar,
    held: Mutex<bool>,
    held_cvar: Condvar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Acquired,
    TimedOut,
}

impl Baton {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            fifo_counter: Mutex::new(0),
            fifo_cvar: Condvar::new(),
            held: Mutex::new(false),
            held_cvar: Condvar::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Blocks until the baton's internal counter equals `counter`, or
    /// `timeout` elapses. On success the caller holds the baton until
    /// `unlock_fifo`.
    pub fn try_lock_fifo(&self, counter: u64, timeout: Duration) -> LockOutcome {
        let deadline = Instant::now() + timeout;
        let mut guard = self.fifo_counter.lock();
        while *guard != counter {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return LockOutcome::TimedOut;
            }
            let result = self.fifo_cvar.wait_for(&mut guard, remaining);
            if result.timed_out() && *guard != counter {
                return LockOutcome::TimedOut;
            }
        }
        LockOutcome::Acquired
    }

    /// Releases the FIFO baton and advances the counter so the next waiter
    /// in sequence can proceed.
    pub fn unlock_fifo(&self) {
        let mut guard = self.fifo_counter.lock();
        *guard += 1;
        self.fifo_cvar.notify_all();
    }

    /// Non-FIFO lock for completions that may arrive out of job order
    /// (channel-scan results, PDC completion).
    pub fn lock(&self, timeout: Duration) -> LockOutcome {
        let deadline = Instant::now() + timeout;
        let mut guard = self.held.lock();
        while *guard {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return LockOutcome::TimedOut;
            }
            let result = self.held_cvar.wait_for(&mut guard, remaining);
            if result.timed_out() && *guard {
                return LockOutcome::TimedOut;
            }
        }
        *guard = true;
        LockOutcome::Acquired
    }

    pub fn unlock(&self) {
        let mut guard = self.held.lock();
        *guard = false;
        self.held_cvar.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_lock_blocks_until_counter_matches() {
        let baton = Arc::new(Baton::new(0));
        let b2 = Arc::clone(&baton);
        let handle = thread::spawn(move || {
            assert_eq!(b2.try_lock_fifo(1, Duration::from_secs(1)), LockOutcome::Acquired);
            b2.unlock_fifo();
        });

        assert_eq!(baton.try_lock_fifo(0, Duration::from_secs(1)), LockOutcome::Acquired);
        baton.unlock_fifo();
        handle.join().unwrap();
    }

    #[test]
    fn fifo_lock_times_out_when_counter_never_reached() {
        let baton = Baton::new(0);
        assert_eq!(baton.try_lock_fifo(5, Duration::from_millis(20)), LockOutcome::TimedOut);
    }

    #[test]
    fn non_fifo_lock_is_mutually_exclusive() {
        let baton = Arc::new(Baton::new(0));
        assert_eq!(baton.lock(Duration::from_secs(1)), LockOutcome::Acquired);
        assert_eq!(baton.lock(Duration::from_millis(20)), LockOutcome::TimedOut);
        baton.unlock();
        assert_eq!(baton.lock(Duration::from_secs(1)), LockOutcome::Acquired);
    }
}
