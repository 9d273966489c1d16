//! Worker (C16): dequeues jobs, invokes the MAC callbacks under the baton,
//! dispatches TX descriptors and channel scans, and finalizes HARQ entries,
//! grounded on spec §4.13 "Worker loop" and §5 "Suspension points".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::phy::external::{ChannelScanner, MacLowPhy, RxSynced, TxGenerator};
use crate::phy::harq::{FinalizePolicy, HarqKey, HarqProcessPool};
use crate::pool::baton::{Baton, LockOutcome};
use crate::pool::irregular::IrregularHeap;
use crate::pool::job::{Job, JobKind, JobQueue, PopResult, SyncReport};
use crate::upper::tpoint::{ChannelScanRequest, FtTpoint, PccEvent, PdcEvent, PtTpoint, TxDescriptor, WorkResult};

pub const KEEP_RUNNING_POLL_PERIOD_MS: u64 = 20;
pub const BATON_WAIT_TIMEOUT_MS: u64 = 100;

/// Either termination-point role a worker may be driving; the worker
/// dispatches jobs identically regardless of role.
pub enum TpointRole {
    Ft(FtTpoint),
    Pt(PtTpoint),
}

#[derive(Default, Debug, Clone, Copy)]
pub struct WorkerStats {
    pub jobs_processed: u64,
    pub tx_sent: u64,
    pub pcc_crc_fail: u64,
    pub pdc_crc_fail: u64,
    pub no_harq_available: u64,
}

/// Drives one worker thread's loop body. Owns no thread itself; `run` is
/// called from whatever OS thread the caller spawns.
///
/// `S` demodulates/decodes PCC and PDC; `G` turns a committed `TxDescriptor`
/// into on-air bytes; `C` runs a channel scan. All three are external
/// collaborators consumed through the traits in `phy::external`.
pub struct Worker<S, G, C>
where
    S: RxSynced<SyncReport = SyncReport, MacLowPhy = MacLowPhy>,
    G: TxGenerator<Descriptor = TxDescriptor, Buffer = Vec<u8>>,
    C: ChannelScanner<ChScan = ChannelScanRequest>,
{
    pub id: usize,
    queue: Arc<JobQueue>,
    baton: Arc<Baton>,
    irregular: Arc<IrregularHeap>,
    harq: HarqProcessPool,
    tpoint: TpointRole,
    rx_synced: S,
    tx_generator: G,
    scanner: C,
    network_id: u32,
    keep_running: Arc<AtomicBool>,
    pub stats: WorkerStats,
}

impl<S, G, C> Worker<S, G, C>
where
    S: RxSynced<SyncReport = SyncReport, MacLowPhy = MacLowPhy>,
    G: TxGenerator<Descriptor = TxDescriptor, Buffer = Vec<u8>>,
    C: ChannelScanner<ChScan = ChannelScanRequest>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        queue: Arc<JobQueue>,
        baton: Arc<Baton>,
        irregular: Arc<IrregularHeap>,
        harq: HarqProcessPool,
        tpoint: TpointRole,
        rx_synced: S,
        tx_generator: G,
        scanner: C,
        network_id: u32,
        keep_running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            queue,
            baton,
            irregular,
            harq,
            tpoint,
            rx_synced,
            tx_generator,
            scanner,
            network_id,
            keep_running,
            stats: WorkerStats::default(),
        }
    }

    /// Main loop: blocks on the job queue with a bounded timeout so
    /// `keep_running` is re-checked at `KEEP_RUNNING_POLL_PERIOD_MS`
    /// cadence.
    pub fn run(&mut self) {
        let timeout = Duration::from_millis(KEEP_RUNNING_POLL_PERIOD_MS);
        loop {
            match self.queue.pop(timeout) {
                PopResult::Job(job) => self.handle_job(job),
                PopResult::Timeout => {
                    if !self.keep_running.load(Ordering::Acquire) {
                        debug!(worker = self.id, "keep_running cleared, draining and exiting");
                        return;
                    }
                }
            }
        }
    }

    fn handle_job(&mut self, job: Job) {
        self.stats.jobs_processed += 1;
        let fifo_cnt = job.fifo_cnt;

        match job.kind {
            JobKind::Regular(report) => {
                if self.baton_fifo(fifo_cnt) {
                    let result = match &mut self.tpoint {
                        TpointRole::Ft(ft) => ft.work_regular(&report),
                        TpointRole::Pt(pt) => pt.work_regular(&report),
                    };
                    self.baton.unlock_fifo();
                    self.dispatch(result);
                }
            }
            JobKind::Irregular(report) => {
                if self.baton_fifo(fifo_cnt) {
                    let result = match &mut self.tpoint {
                        TpointRole::Ft(ft) => ft.work_irregular(&report, &mut self.harq),
                        TpointRole::Pt(pt) => pt.work_irregular(&report),
                    };
                    self.baton.unlock_fifo();
                    self.dispatch(result);
                }
            }
            JobKind::Application(report) => {
                if self.baton_fifo(fifo_cnt) {
                    let result = match &mut self.tpoint {
                        TpointRole::Ft(ft) => ft.work_application(&report),
                        TpointRole::Pt(pt) => pt.work_application(&report),
                    };
                    self.baton.unlock_fifo();
                    self.dispatch(result);
                }
            }
            JobKind::Sync(report) => self.handle_sync(fifo_cnt, &report),
        }
    }

    fn baton_fifo(&self, fifo_cnt: u64) -> bool {
        matches!(
            self.baton.try_lock_fifo(fifo_cnt, Duration::from_millis(BATON_WAIT_TIMEOUT_MS)),
            LockOutcome::Acquired
        )
    }

    /// Sync path per spec §4.13: demodulate PCC first; only a valid PLCF
    /// decides whether a PDC follows, and the PDC demod is fed a
    /// `MacLowPhy` descriptor built from the PCC's own decoded fields
    /// rather than the raw sync report.
    fn handle_sync(&mut self, fifo_cnt: u64, report: &SyncReport) {
        if !self.baton_fifo(fifo_cnt) {
            return;
        }

        let pcc = self.rx_synced.demoddecod_rx_pcc(report);
        let pcc = match pcc {
            Ok(pcc) if pcc.has_any_plcf != 0 => pcc,
            _ => {
                self.stats.pcc_crc_fail += 1;
                self.baton.unlock_fifo();
                return;
            }
        };

        let event = PccEvent { hw_id: report.hw_id, rx_time: report.rx_time, snr_db: pcc.snr_db };
        let result = match &mut self.tpoint {
            TpointRole::Ft(_) => WorkResult::default(),
            TpointRole::Pt(pt) => pt.work_pcc(&event, &mut self.harq),
        };
        self.baton.unlock_fifo();
        self.dispatch(result);

        let harq_key = HarqKey {
            plcf_type: pcc.plcf_type,
            network_id: self.network_id,
            packet_sizing: pcc.packet_length_samples as u32,
        };
        let harq_rx_index = match self.harq.get_process_rx(harq_key) {
            Some(idx) => idx,
            None => {
                self.stats.no_harq_available += 1;
                return;
            }
        };

        // PDC completion is out-of-FIFO-order; the non-FIFO baton guards it.
        if matches!(self.baton.lock(Duration::from_millis(BATON_WAIT_TIMEOUT_MS)), LockOutcome::Acquired) {
            let maclow_phy = MacLowPhy {
                hw_id: report.hw_id,
                rx_time: report.rx_time,
                plcf_type: pcc.plcf_type,
                packet_length_samples: pcc.packet_length_samples,
                harq_rx_index,
            };
            let pdc = self.rx_synced.demoddecod_rx_pdc(&maclow_phy);
            let result = if pdc.crc_ok {
                self.harq.finalize_rx(harq_rx_index, FinalizePolicy::ResetAndTerminate);
                match &mut self.tpoint {
                    TpointRole::Pt(pt) => pt.work_pdc(&PdcEvent {
                        hw_id: report.hw_id,
                        rx_time: report.rx_time,
                        snr_db: pdc.snr_db,
                        mac_pdu: pdc.mac_pdu,
                    }),
                    TpointRole::Ft(_) => WorkResult::default(),
                }
            } else {
                self.stats.pdc_crc_fail += 1;
                self.harq.finalize_rx(harq_rx_index, FinalizePolicy::ResetAndTerminate);
                match &mut self.tpoint {
                    TpointRole::Pt(pt) => pt.work_pdc_error(&event),
                    TpointRole::Ft(_) => WorkResult::default(),
                }
            };
            self.baton.unlock();
            self.dispatch(result);
        }
    }

    /// Common post-callback handling: generate and hand off TX packets, run
    /// any requested channel scan, push any irregular-callback request, and
    /// finalize the HARQ entries the callback committed to transmitting.
    fn dispatch(&mut self, result: WorkResult) {
        if let Some(req) = result.irregular_request {
            if let Err(err) = self.irregular.push(req) {
                warn!(worker = self.id, %err, "irregular heap overflow, dropping callback request");
            }
        }

        if let Some(mut scan) = result.channel_scan {
            debug!(worker = self.id, hw_id = scan.hw_id, "running channel scan");
            self.scanner.scan(&mut scan);
        }

        for descriptor in result.tx_descriptors {
            let mut buffer = vec![0u8; descriptor.length.max(0) as usize];
            self.tx_generator.generate_tx_packet(&descriptor, &mut buffer);
            self.stats.tx_sent += 1;
            self.harq.finalize_tx(descriptor.harq_tx_index, FinalizePolicy::ResetAndTerminate);
        }
    }
}
