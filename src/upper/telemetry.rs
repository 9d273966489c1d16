//! Telemetry (optional, ambient stack per SPEC_FULL.md §1): one JSON object
//! per line appended to a file, grounded on spec §6 "Persisted state" and
//! on the teacher's `serde`-derived wire structs (`mac_frame.rs`/`encode.rs`
//! use `serde` for everything that crosses a boundary).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SyncDiagnostics {
    pub drift_factor: f64,
    pub ppx_deviation: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhyDiagnostics {
    pub snr_db: f64,
    pub mcs: u32,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct MacDiagnostics {
    pub pcc_crc_fail: u64,
    pub pdc_crc_fail: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlcfDiagnostics {
    pub has_any_plcf: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub worker_id: usize,
    pub time_since_epoch_ns: u64,
    pub sync: Option<SyncDiagnostics>,
    pub phy: Option<PhyDiagnostics>,
    pub mac: MacDiagnostics,
    pub plcf: Option<PlcfDiagnostics>,
}

/// Appends one record per line; the file is opened once and kept buffered.
pub struct TelemetrySink {
    writer: BufWriter<File>,
}

impl TelemetrySink {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { writer: BufWriter::new(file) })
    }

    pub fn append(&mut self, record: &TelemetryRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_to_single_line_json() {
        let record = TelemetryRecord {
            worker_id: 0,
            time_since_epoch_ns: 1_000,
            sync: Some(SyncDiagnostics { drift_factor: 1.0000005, ppx_deviation: 3 }),
            phy: Some(PhyDiagnostics { snr_db: 22.0, mcs: 5 }),
            mac: MacDiagnostics::default(),
            plcf: Some(PlcfDiagnostics { has_any_plcf: 1 }),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"worker_id\":0"));
    }
}
