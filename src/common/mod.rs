//! Leaf data types shared across the MAC and PHY layers.

pub mod ant;
pub mod ema;
pub mod expiring;

pub use ant::AntVec;
pub use ema::Ema;
pub use expiring::Expiring;
