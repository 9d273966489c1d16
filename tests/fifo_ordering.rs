//! Spec §8 scenario S6: two worker threads draining the same job queue must
//! invoke MAC callbacks in `fifo_cnt` order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use dectnrp_core::pool::baton::Baton;
use dectnrp_core::pool::job::{JobKind, JobQueue, PopResult, SyncReport};

#[test]
fn s6_fifo_worker_ordering() {
    const N: u64 = 1000;

    let queue = Arc::new(JobQueue::new());
    for _ in 0..N {
        queue.push(JobKind::Sync(SyncReport { hw_id: 0, rx_time: 0 }));
    }

    let baton = Arc::new(Baton::new(0));
    let observed: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let keep_running = Arc::new(AtomicBool::new(true));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let queue = Arc::clone(&queue);
        let baton = Arc::clone(&baton);
        let observed = Arc::clone(&observed);
        let keep_running = Arc::clone(&keep_running);
        handles.push(thread::spawn(move || loop {
            match queue.pop(Duration::from_millis(20)) {
                PopResult::Job(job) => {
                    if baton.try_lock_fifo(job.fifo_cnt, Duration::from_millis(200))
                        == dectnrp_core::pool::baton::LockOutcome::Acquired
                    {
                        observed.lock().unwrap().push(job.fifo_cnt);
                        baton.unlock_fifo();
                    }
                }
                PopResult::Timeout => {
                    if !keep_running.load(Ordering::Acquire) && observed.lock().unwrap().len() as u64 >= N {
                        return;
                    }
                    if observed.lock().unwrap().len() as u64 >= N {
                        return;
                    }
                }
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    let seq = observed.lock().unwrap();
    assert_eq!(seq.len(), N as usize);
    assert!(seq.windows(2).all(|w| w[0] < w[1]), "fifo_cnt sequence must be strictly increasing");
}
