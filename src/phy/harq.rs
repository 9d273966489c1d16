//! HARQ process pool (C13): fixed arena of TX/RX soft-buffer entries keyed
//! by `(PLCF-type, network-id, packet-sizing)`, grounded on
//! `phy/harq/buffer_tx.cpp` (per-entry `a`/`d` buffer sizing) and spec §4.12
//! / §9 ("HARQ as arena").

pub const PLCF_TYPE2_MAX_BYTES: usize = 10;

/// `(PLCF-type, network-id, packet-sizing)` — the in-use key an entry is
/// bound to between `get_process_*` and `finalize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HarqKey {
    pub plcf_type: u32,
    pub network_id: u32,
    pub packet_sizing: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizePolicy {
    ResetAndTerminate,
    KeepRunning,
}

/// Owns `a_plcf`/`a_tb` byte buffers sized for worst-case PLCF and
/// transport block, plus a per-codeblock soft-buffer handle. The soft
/// buffer itself is an opaque payload here: its FEC-specific contents are
/// owned by the external sync/FEC collaborator (spec §6).
pub struct HarqEntry {
    in_use: bool,
    key: Option<HarqKey>,
    pub a_plcf: Vec<u8>,
    pub a_tb: Vec<u8>,
    pub softbuffer: Vec<u8>,
}

impl HarqEntry {
    fn new(n_tb_byte_max: usize, softbuffer_byte_max: usize) -> Self {
        Self {
            in_use: false,
            key: None,
            a_plcf: vec![0u8; PLCF_TYPE2_MAX_BYTES],
            a_tb: vec![0u8; n_tb_byte_max],
            softbuffer: vec![0u8; softbuffer_byte_max],
        }
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    pub fn key(&self) -> Option<HarqKey> {
        self.key
    }

    fn reset(&mut self) {
        self.in_use = false;
        self.key = None;
        self.a_plcf.iter_mut().for_each(|b| *b = 0);
        self.a_tb.iter_mut().for_each(|b| *b = 0);
        self.softbuffer.iter_mut().for_each(|b| *b = 0);
    }
}

/// Pool of `N_tx` TX entries and `N_rx` RX entries. Handles are indices into
/// the respective arena; there is no shared-ownership smart pointer.
pub struct HarqProcessPool {
    tx: Vec<HarqEntry>,
    rx: Vec<HarqEntry>,
}

impl HarqProcessPool {
    pub fn new(n_tx: usize, n_rx: usize, n_tb_byte_max: usize, softbuffer_byte_max: usize) -> Self {
        Self {
            tx: (0..n_tx).map(|_| HarqEntry::new(n_tb_byte_max, softbuffer_byte_max)).collect(),
            rx: (0..n_rx).map(|_| HarqEntry::new(n_tb_byte_max, softbuffer_byte_max)).collect(),
        }
    }

    /// Returns a free TX entry's index and binds `key`, or `None` if every
    /// TX entry is in use. Concurrent requests observe each entry at most
    /// once in use (spec §4.12 contract) because this pool is always
    /// accessed from within a single baton-held MAC callback.
    pub fn get_process_tx(&mut self, key: HarqKey) -> Option<usize> {
        Self::acquire(&mut self.tx, key)
    }

    pub fn get_process_rx(&mut self, key: HarqKey) -> Option<usize> {
        Self::acquire(&mut self.rx, key)
    }

    fn acquire(entries: &mut [HarqEntry], key: HarqKey) -> Option<usize> {
        let idx = entries.iter().position(|e| !e.in_use)?;
        entries[idx].in_use = true;
        entries[idx].key = Some(key);
        Some(idx)
    }

    pub fn tx_entry(&self, idx: usize) -> &HarqEntry {
        &self.tx[idx]
    }

    pub fn tx_entry_mut(&mut self, idx: usize) -> &mut HarqEntry {
        &mut self.tx[idx]
    }

    pub fn rx_entry(&self, idx: usize) -> &HarqEntry {
        &self.rx[idx]
    }

    pub fn rx_entry_mut(&mut self, idx: usize) -> &mut HarqEntry {
        &mut self.rx[idx]
    }

    pub fn finalize_tx(&mut self, idx: usize, policy: FinalizePolicy) {
        Self::finalize(&mut self.tx[idx], policy);
    }

    pub fn finalize_rx(&mut self, idx: usize, policy: FinalizePolicy) {
        Self::finalize(&mut self.rx[idx], policy);
    }

    fn finalize(entry: &mut HarqEntry, policy: FinalizePolicy) {
        match policy {
            FinalizePolicy::ResetAndTerminate => entry.reset(),
            FinalizePolicy::KeepRunning => entry.in_use = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> HarqKey {
        HarqKey { plcf_type: 1, network_id: 1, packet_sizing: 0 }
    }

    #[test]
    fn acquire_and_exhaust_pool() {
        let mut pool = HarqProcessPool::new(2, 2, 16, 16);
        assert!(pool.get_process_tx(key()).is_some());
        assert!(pool.get_process_tx(key()).is_some());
        assert!(pool.get_process_tx(key()).is_none());
    }

    #[test]
    fn reset_and_terminate_clears_buffers() {
        let mut pool = HarqProcessPool::new(1, 1, 4, 4);
        let idx = pool.get_process_tx(key()).unwrap();
        pool.tx_entry_mut(idx).a_tb[0] = 0xFF;
        pool.finalize_tx(idx, FinalizePolicy::ResetAndTerminate);
        assert!(!pool.tx_entry(idx).is_in_use());
        assert_eq!(pool.tx_entry(idx).a_tb[0], 0);
        assert!(pool.get_process_tx(key()).is_some());
    }

    #[test]
    fn keep_running_preserves_buffer_contents() {
        let mut pool = HarqProcessPool::new(1, 1, 4, 4);
        let idx = pool.get_process_tx(key()).unwrap();
        pool.tx_entry_mut(idx).a_tb[0] = 0xAB;
        pool.finalize_tx(idx, FinalizePolicy::KeepRunning);
        assert!(!pool.tx_entry(idx).is_in_use());
        assert_eq!(pool.tx_entry(idx).a_tb[0], 0xAB);
    }
}
