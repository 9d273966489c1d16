//! Error taxonomy per spec §7: configuration errors abort startup, link and
//! timing errors are returned and counted, synchronization loss is fatal.

use thiserror::Error;

/// Raised at init time; construction of a component must abort on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("sample rate {samp_rate} is not evenly divisible by unit divisor {divisor}")]
    UnitNotRepresentable { samp_rate: u64, divisor: u64 },

    #[error("resource capacity ({capacity}) exceeded for direction")]
    ResourceOverflow { capacity: usize },

    #[error("resource is not orthogonal to an existing resource in the same direction")]
    ResourceNotOrthogonal,

    #[error("identity already present under long-id, short-id, or connection-index map")]
    DuplicateIdentity,

    #[error("irregular-callback heap capacity ({capacity}) exceeded")]
    IrregularOverflow { capacity: usize },
}

/// Transient link errors: packet is dropped, counted in statistics, MAC is
/// notified via an "absent" return rather than an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("PCC CRC check failed")]
    PccCrcFail,
    #[error("PDC CRC check failed")]
    PdcCrcFail,
    #[error("unknown PLCF header format {header_format}")]
    UnknownHeaderFormat { header_format: u8 },
    #[error("PLCF field exceeds radio-device-class limit")]
    RdcLimitExceeded,
    #[error("no free HARQ process available for the requested key")]
    NoHarqAvailable,
}

/// Timing invariant violations: treated as "no TX", firmware retries later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("requested TX time lies in the past")]
    TxTimeInPast,
    #[error("no TX opportunity satisfies the allocation window")]
    TxOpportunityNotFound,
}

/// Synchronization loss: fatal per spec §7. A production implementation
/// should degrade to association state; this core only classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("PPX deviation {deviation} exceeds time_deviation_max {max}")]
    SyncLost { deviation: i64, max: i64 },
}
