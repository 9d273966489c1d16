//! Wireless-link core for a DECT NR+ software-defined radio stack.
//!
//! This crate implements the time-slotted allocation engine, PLL/PPX
//! synchronization, AGC, CQI and MIMO codebook selection, the PLCF decoder,
//! the HARQ process pool, the job queue / FIFO baton / worker pool, and the
//! termination-point firmware state machines that tie them together. The
//! on-air waveform, FEC, and raw radio transport are external collaborators
//! (see `phy::external`) consumed through trait contracts rather than
//! implemented here.

pub mod common;
pub mod config;
pub mod error;
pub mod mac;
pub mod phy;
pub mod pool;
pub mod time;
pub mod upper;

pub use config::RuntimeConfig;
pub use error::{ConfigError, LinkError, SyncError, TimingError};
