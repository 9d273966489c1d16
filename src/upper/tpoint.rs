//! Termination-point firmware (C18): assembles the lower components into
//! FT or PT state machines, grounded on spec §4.16. State transitions are
//! driven by explicit calls from the worker loop (`pool::worker`); this
//! module owns no threads of its own.

use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::mac::allocation::{Allocation, Direction};
use crate::mac::pll::Pll;
use crate::mac::ppx::{Ppx, PpxConfig};
use crate::phy::cqi::CqiLut;
use crate::phy::harq::{HarqKey, HarqProcessPool};
use crate::phy::mimo::{select_codebook_index, AggregationMetric, ChannelEstimate, CodebookEntry};
use crate::phy::plcf::{Plcf10, Plcf2};
use crate::common::Expiring;
use crate::pool::irregular::IrregularReport;
use crate::pool::job::{ApplicationReport, CallbackReport, SyncReport};

/// Outstanding unicast downlink payloads an FT will hold before dropping the
/// oldest queued application write; mirrors the "8 outstanding TX" HARQ
/// entry count from spec §4.16.
const MAX_PENDING_DL: usize = 8;

/// A transmit opportunity the firmware has committed to, handed to the
/// worker loop for dispatch to the radio/TX-generator.
#[derive(Debug, Clone)]
pub struct TxDescriptor {
    pub hw_id: usize,
    pub direction: Direction,
    pub time: i64,
    pub length: i64,
    pub harq_tx_index: usize,
}

/// A request to run a channel scan, surfaced from a MAC callback.
#[derive(Debug, Clone, Copy)]
pub struct ChannelScanRequest {
    pub hw_id: usize,
    pub duration: i64,
}

/// Every `work_*` entry point returns this: TX descriptors to dispatch, an
/// optional channel-scan request, and an optional irregular-callback
/// request, per spec §6 MAC-callback contract. No exceptions escape.
#[derive(Debug, Clone, Default)]
pub struct WorkResult {
    pub tx_descriptors: Vec<TxDescriptor>,
    pub channel_scan: Option<ChannelScanRequest>,
    pub irregular_request: Option<IrregularReport>,
    pub pdu_accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtState {
    Resource,
    Steady,
    Dissociation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtState {
    Association,
    Steady,
    Dissociation,
}

/// Reason the MAC was invoked with a PCC/PDC event, passed to `work_pcc` /
/// `work_pdc` / `work_pdc_error`.
#[derive(Debug, Clone, Copy)]
pub struct PccEvent {
    pub hw_id: usize,
    pub rx_time: i64,
    pub snr_db: f64,
}

#[derive(Debug, Clone)]
pub struct PdcEvent {
    pub hw_id: usize,
    pub rx_time: i64,
    pub snr_db: f64,
    pub mac_pdu: Vec<u8>,
}

/// FT (fixed / base-station) termination point: `Resource` (channel scan
/// until a clear frequency is found) -> `Steady` -> `Dissociation`.
pub struct FtTpoint {
    state: FtState,
    beacon_prepare_duration: i64,
    network_id: u32,
    dfmcs_beacon: u8,
    allocation: Allocation,
    ppx: Ppx,
    pending_dl: VecDeque<Vec<u8>>,
}

impl FtTpoint {
    pub fn new(beacon_prepare_duration: i64, network_id: u32, allocation: Allocation, ppx_config: PpxConfig) -> Self {
        Self {
            state: FtState::Resource,
            beacon_prepare_duration,
            network_id,
            dfmcs_beacon: 0,
            allocation,
            ppx: Ppx::new(ppx_config),
            pending_dl: VecDeque::new(),
        }
    }

    pub fn state(&self) -> FtState {
        self.state
    }

    pub fn work_start(&mut self, _now: i64) -> WorkResult {
        WorkResult {
            channel_scan: Some(ChannelScanRequest { hw_id: 0, duration: 1000 }),
            ..Default::default()
        }
    }

    /// `work_channel`: a clear frequency was found; transitions to `Steady`
    /// and schedules the first beacon to align with the next full second.
    pub fn work_channel(&mut self, samples_at_next_full_second: i64) -> WorkResult {
        assert_eq!(self.state, FtState::Resource, "channel scan result outside Resource state");
        self.state = FtState::Steady;
        self.allocation.set_beacon_last_known(samples_at_next_full_second);
        self.ppx.set_ppx_rising_edge(samples_at_next_full_second);
        let beacon_scheduled = samples_at_next_full_second;
        WorkResult {
            irregular_request: Some(IrregularReport {
                handle: 0,
                time: beacon_scheduled - self.beacon_prepare_duration,
            }),
            ..Default::default()
        }
    }

    pub fn work_regular(&mut self, _report: &CallbackReport) -> WorkResult {
        WorkResult::default()
    }

    /// Steady-state beacon tick (spec §4.16 FT-steady): advances the beacon
    /// raster and own clock, builds and transmits the type-1 PLCF-format-0
    /// beacon, drains queued unicast downlink while a resource and a free
    /// HARQ TX entry remain, and reschedules the next beacon irregular
    /// callback.
    pub fn work_irregular(&mut self, report: &CallbackReport, harq: &mut HarqProcessPool) -> WorkResult {
        if self.state != FtState::Steady {
            return WorkResult::default();
        }

        self.allocation.set_beacon_last_known(report.now);
        let next_edge = self.ppx.extrapolate_next_rising_edge();

        let mut tx_descriptors = Vec::new();

        let beacon = Plcf10 {
            header_format: 0,
            packet_length_type: 0,
            packet_length: 1,
            short_network_id: (self.network_id & 0xFF) as u8,
            transmitter_id: 0,
            transmit_power: 0,
            dfmcs: self.dfmcs_beacon,
        };
        let beacon_key = HarqKey { plcf_type: 1, network_id: self.network_id, packet_sizing: beacon.packet_length };
        if let Some(idx) = harq.get_process_tx(beacon_key) {
            let bytes = beacon.pack();
            harq.tx_entry_mut(idx).a_plcf[..bytes.len()].copy_from_slice(&bytes);
            tx_descriptors.push(TxDescriptor {
                hw_id: 0,
                direction: Direction::Dl,
                time: report.now,
                length: bytes.len() as i64,
                harq_tx_index: idx,
            });
        }

        while let Some(payload) = self.pending_dl.front() {
            let Some(opp) = self.allocation.get_tx_opportunity(Direction::Dl, report.now, report.now) else {
                break;
            };
            let dl_key = HarqKey {
                plcf_type: 2,
                network_id: self.network_id,
                packet_sizing: payload.len() as u32,
            };
            let Some(idx) = harq.get_process_tx(dl_key) else {
                break;
            };
            let payload = self.pending_dl.pop_front().expect("front() just returned Some");
            let entry = harq.tx_entry_mut(idx);
            let n = payload.len().min(entry.a_tb.len());
            entry.a_tb[..n].copy_from_slice(&payload[..n]);
            tx_descriptors.push(TxDescriptor {
                hw_id: 0,
                direction: Direction::Dl,
                time: opp.time,
                length: opp.length_samples,
                harq_tx_index: idx,
            });
        }

        WorkResult {
            tx_descriptors,
            irregular_request: Some(IrregularReport {
                handle: 0,
                time: next_edge - self.beacon_prepare_duration,
            }),
            ..Default::default()
        }
    }

    /// Queues a unicast downlink payload for the next `work_irregular` drain;
    /// drops the oldest entry once `MAX_PENDING_DL` is exceeded rather than
    /// failing, since application data loss under backpressure is preferable
    /// to blocking the beacon tick.
    fn queue_downlink(&mut self, payload: Vec<u8>) {
        if self.pending_dl.len() >= MAX_PENDING_DL {
            self.pending_dl.pop_front();
        }
        self.pending_dl.push_back(payload);
    }

    pub fn work_application(&mut self, report: &ApplicationReport) -> WorkResult {
        self.queue_downlink(report.payload.clone());
        WorkResult::default()
    }

    pub fn work_stop(&mut self) -> WorkResult {
        self.state = FtState::Dissociation;
        WorkResult::default()
    }
}

/// PT (portable / client) termination point: `Association` (listen for
/// beacon, authenticate) -> `Steady` -> `Dissociation`.
pub struct PtTpoint {
    state: PtState,
    network_id: u32,
    pll: Pll,
    ppx: Ppx,
    cqi: CqiLut,
    allocation: Allocation,
    codebook: Vec<CodebookEntry>,
    csi: Option<Expiring<ChannelEstimate>>,
    mcs: u32,
    feedback_toggle: bool,
}

impl PtTpoint {
    pub fn new(
        network_id: u32,
        pll: Pll,
        ppx: Ppx,
        cqi: CqiLut,
        allocation: Allocation,
        codebook: Vec<CodebookEntry>,
    ) -> Self {
        Self {
            state: PtState::Association,
            network_id,
            pll,
            ppx,
            cqi,
            allocation,
            codebook,
            csi: None,
            mcs: 0,
            feedback_toggle: false,
        }
    }

    pub fn state(&self) -> PtState {
        self.state
    }

    /// Feeds a freshly estimated MIMO channel, valid until `now + ttl`; read
    /// back by `work_pcc` when choosing a feedback codebook index.
    pub fn provide_mimo_csi(&mut self, estimate: ChannelEstimate, now: i64, ttl: i64) {
        self.csi = Some(Expiring::new(estimate, now + ttl));
    }

    pub fn work_start(&mut self, _now: i64) -> WorkResult {
        WorkResult::default()
    }

    fn next_feedback_format(&mut self) -> u8 {
        let format = if self.feedback_toggle { 5 } else { 4 };
        self.feedback_toggle = !self.feedback_toggle;
        format
    }

    /// Steady-state PCC handling (spec §4.16 PT-steady): on association,
    /// transitions to `Steady`; while steady, updates the PLL/PPX from the
    /// observed beacon-aligned PCC, chooses an MCS from the CQI LUT, and
    /// (if a still-valid MIMO CSI and a UL opportunity and free HARQ TX
    /// entry are all available) transmits a type-2 feedback PLCF with a
    /// codebook index, round-robining the feedback format between {4, 5}.
    pub fn work_pcc(&mut self, event: &PccEvent, harq: &mut HarqProcessPool) -> WorkResult {
        if self.state == PtState::Association {
            self.state = PtState::Steady;
        }
        if self.state != PtState::Steady {
            return WorkResult::default();
        }

        let beacon_period = self.allocation.beacon_period();
        let _ = self.ppx.provide_beacon_time(event.rx_time, beacon_period);
        self.pll.provide_beacon_time(event.rx_time, beacon_period);
        self.allocation.set_beacon_last_known(event.rx_time);
        self.mcs = self.cqi.clamp_mcs(self.cqi.get_highest_mcs_possible(event.snr_db));

        let codebook_index = self.csi.as_ref().and_then(|csi| {
            csi.valid_at(event.rx_time)
                .then(|| select_codebook_index(csi.get_unchecked(), &self.codebook, AggregationMetric::MaxSum))
        });

        let mut tx_descriptors = Vec::new();
        if let Some(index) = codebook_index {
            if let Some(opp) = self.allocation.get_tx_opportunity(Direction::Ul, event.rx_time, event.rx_time) {
                let feedback = Plcf2 {
                    header_format: 0,
                    packet_length_type: 0,
                    packet_length: 1,
                    short_network_id: (self.network_id & 0xFF) as u8,
                    transmitter_id: 0,
                    receiver_id: 0,
                    transmit_power: 0,
                    dfmcs: self.mcs as u8,
                    num_spatial_streams: 1,
                    feedback_format: self.next_feedback_format(),
                    feedback_payload: index as u16,
                };
                let key = HarqKey { plcf_type: 2, network_id: self.network_id, packet_sizing: feedback.packet_length };
                if let Some(idx) = harq.get_process_tx(key) {
                    let bytes = feedback.pack();
                    harq.tx_entry_mut(idx).a_plcf[..bytes.len()].copy_from_slice(&bytes);
                    tx_descriptors.push(TxDescriptor {
                        hw_id: event.hw_id,
                        direction: Direction::Ul,
                        time: opp.time,
                        length: opp.length_samples,
                        harq_tx_index: idx,
                    });
                }
            }
        }

        WorkResult { tx_descriptors, ..Default::default() }
    }

    pub fn work_pdc(&mut self, _event: &PdcEvent) -> WorkResult {
        WorkResult { pdu_accepted: true, ..Default::default() }
    }

    pub fn work_pdc_error(&mut self, _event: &PccEvent) -> WorkResult {
        WorkResult::default()
    }

    pub fn work_regular(&mut self, _report: &CallbackReport) -> WorkResult {
        WorkResult::default()
    }

    pub fn work_irregular(&mut self, _report: &CallbackReport) -> WorkResult {
        WorkResult::default()
    }

    pub fn work_application(&mut self, _report: &ApplicationReport) -> WorkResult {
        WorkResult::default()
    }

    pub fn work_stop(&mut self) -> WorkResult {
        self.state = PtState::Dissociation;
        WorkResult::default()
    }
}

/// Dispatches a sync-report's `work_pcc`; used by the worker to route to
/// the right firmware role without the worker knowing FT vs PT.
pub trait SyncCallbacks {
    fn on_sync_report(&mut self, report: &SyncReport) -> WorkResult;
}
