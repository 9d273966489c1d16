//! Upper layer: termination-point firmware state machines and telemetry.

pub mod telemetry;
pub mod tpoint;

pub use telemetry::{TelemetryRecord, TelemetrySink};
pub use tpoint::{FtState, FtTpoint, PtState, PtTpoint, WorkResult};
