//! Job queue (C14, half): a tagged union of report kinds carrying a
//! strictly increasing FIFO counter, queued on a multi-producer
//! multi-consumer channel, grounded on spec §4.13 and the
//! `crossbeam_channel::Sender`/bounded-queue pattern used for the shred
//! ingest pipeline in the example pack.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// Sync-report payload produced by the external synchronizer.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub hw_id: usize,
    pub rx_time: i64,
}

/// Regular/irregular callback report produced by a scheduler tick.
#[derive(Debug, Clone)]
pub struct CallbackReport {
    pub now: i64,
}

/// Application-tunnel report (user-plane data ready to send or delivered).
#[derive(Debug, Clone)]
pub struct ApplicationReport {
    pub conn_index: usize,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum JobKind {
    Regular(CallbackReport),
    Irregular(CallbackReport),
    Sync(SyncReport),
    Application(ApplicationReport),
}

/// A queued unit of work. `fifo_cnt` is assigned by `JobQueue::push` and is
/// strictly increasing across the queue's lifetime; the baton (`pool::baton`)
/// uses it to serialize MAC callback invocation in submission order.
#[derive(Debug, Clone)]
pub struct Job {
    pub kind: JobKind,
    pub fifo_cnt: u64,
}

pub struct JobQueue {
    tx: Sender<Job>,
    rx: Receiver<Job>,
    next_fifo_cnt: AtomicU64,
}

pub enum PopResult {
    Job(Job),
    Timeout,
}

impl JobQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx, next_fifo_cnt: AtomicU64::new(0) }
    }

    /// Clones a sender handle for a producer thread.
    pub fn sender(&self) -> Sender<Job> {
        self.tx.clone()
    }

    /// Assigns the next FIFO counter and enqueues `kind`.
    pub fn push(&self, kind: JobKind) -> u64 {
        let fifo_cnt = self.next_fifo_cnt.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(Job { kind, fifo_cnt });
        fifo_cnt
    }

    /// Blocks up to `timeout`; returns `PopResult::Timeout` rather than
    /// blocking indefinitely, so a worker can re-poll its keep-running flag.
    pub fn pop(&self, timeout: Duration) -> PopResult {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => PopResult::Job(job),
            Err(RecvTimeoutError::Timeout) => PopResult::Timeout,
            Err(RecvTimeoutError::Disconnected) => PopResult::Timeout,
        }
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_counters_strictly_increase() {
        let q = JobQueue::new();
        let a = q.push(JobKind::Sync(SyncReport { hw_id: 0, rx_time: 0 }));
        let b = q.push(JobKind::Sync(SyncReport { hw_id: 0, rx_time: 1 }));
        let c = q.push(JobKind::Sync(SyncReport { hw_id: 0, rx_time: 2 }));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn pop_returns_jobs_in_push_order() {
        let q = JobQueue::new();
        q.push(JobKind::Sync(SyncReport { hw_id: 0, rx_time: 10 }));
        q.push(JobKind::Sync(SyncReport { hw_id: 0, rx_time: 20 }));
        let first = match q.pop(Duration::from_millis(100)) {
            PopResult::Job(j) => j,
            PopResult::Timeout => panic!("expected a job"),
        };
        let second = match q.pop(Duration::from_millis(100)) {
            PopResult::Job(j) => j,
            PopResult::Timeout => panic!("expected a job"),
        };
        assert!(first.fifo_cnt < second.fifo_cnt);
    }

    #[test]
    fn pop_times_out_on_empty_queue() {
        let q = JobQueue::new();
        assert!(matches!(q.pop(Duration::from_millis(10)), PopResult::Timeout));
    }
}
