//! Concurrency primitives: job queue, FIFO baton, irregular-callback heap,
//! regular callbacks scheduler, and the worker loop that ties them together.

pub mod baton;
pub mod callbacks;
pub mod irregular;
pub mod job;
pub mod worker;

pub use baton::{Baton, LockOutcome};
pub use callbacks::CallbackScheduler;
pub use irregular::{IrregularHeap, IrregularReport};
pub use job::{ApplicationReport, CallbackReport, Job, JobKind, JobQueue, PopResult, SyncReport};
pub use worker::{TpointRole, Worker, WorkerStats};
