//! Contracts for collaborators this core consumes but does not implement
//! (spec §6): radio hardware, the sample buffers, and the sync/FEC stack.
//! Grounded on the consumed-interface list in spec §6 and on the shape of
//! `rx_synced`/`tx`/`chscanner` calls in `original_source/lib/src/phy`.

use crate::error::LinkError;

/// Minimum settling-time categories reported by the radio hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlingKind {
    Turnaround,
    Freq,
    Gain,
}

/// The receive sample buffer: current time and blocking wait-until.
pub trait RxBuffer {
    fn get_rx_time_passed(&self) -> i64;
    /// Blocks until `get_rx_time_passed() >= t`; returns the actual time.
    fn wait_until(&self, t: i64) -> i64;
}

pub trait TxBufferPool {
    type Buffer;
    fn get_buffer_tx_to_fill(&mut self) -> Option<&mut Self::Buffer>;
}

/// Radio hardware control surface.
pub trait RadioHardware {
    fn set_command_time(&mut self, t: i64);
    fn set_tx_power_ant_0dbfs_tc(&mut self, dbm: f64);
    fn set_rx_power_ant_0dbfs_uniform_tc(&mut self, dbm: f64);
    fn set_freq_tc(&mut self, hz: f64);
    fn schedule_pulse_tc(&mut self, rising: i64, falling: i64);
    fn get_tmin_samples(&self, kind: SettlingKind) -> i64;
    fn get_pps_to_full_second_measured_samples(&self) -> i64;
}

/// PCC demodulation/decoding report: PLCF-decoder state, the PLCF type that
/// decoded, the packet length it names (for HARQ key / PDC timing), and SNR.
pub struct PccReport {
    pub has_any_plcf: u32,
    pub plcf_type: u32,
    pub packet_length_samples: i64,
    pub snr_db: f64,
}

/// Descriptor for the PDC half of a sync report: built from the PCC's
/// decoded PLCF once a valid one is found, so `demoddecod_rx_pdc` knows
/// where and how large the transport block is rather than re-deriving it
/// from the raw sync report.
#[derive(Debug, Clone, Copy)]
pub struct MacLowPhy {
    pub hw_id: usize,
    pub rx_time: i64,
    pub plcf_type: u32,
    pub packet_length_samples: i64,
    pub harq_rx_index: usize,
}

/// PDC demodulation/decoding report: CRC status, decoded MAC-PDU bytes, SNR,
/// and a MIMO report index.
pub struct PdcReport {
    pub crc_ok: bool,
    pub mac_pdu: Vec<u8>,
    pub snr_db: f64,
    pub codebook_index: Option<usize>,
}

/// Synchronized receiver: demodulates/decodes PCC then PDC for a given sync
/// report and MAC-low-PHY descriptor respectively.
pub trait RxSynced {
    type SyncReport;
    type MacLowPhy;

    fn demoddecod_rx_pcc(&mut self, sync_report: &Self::SyncReport) -> Result<PccReport, LinkError>;
    fn demoddecod_rx_pdc(&mut self, maclow_phy: &Self::MacLowPhy) -> PdcReport;
}

/// Deterministic, no-alloc TX packet generator.
pub trait TxGenerator {
    type Descriptor;
    type Buffer;
    fn generate_tx_packet(&mut self, descriptor: &Self::Descriptor, buffer: &mut Self::Buffer);
}

/// In-place RMS measurement of the buffered IQ stream for channel scans.
pub trait ChannelScanner {
    type ChScan;
    fn scan(&mut self, chscan: &mut Self::ChScan);
}
