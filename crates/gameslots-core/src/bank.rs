//! Slot bank: enumeration, classification and the load/verify pipeline
//!
//! A [`SlotBank`] owns a fixed table of [`Slot`]s over one
//! [`SlotStore`]. [`refresh`](SlotBank::refresh) rebuilds the table
//! wholesale from storage; [`load`](SlotBank::load) copies a slot onto
//! the active image and immediately verifies the transfer by digesting
//! both regions independently.
//!
//! Per load operation the pipeline moves through
//! `Idle -> CopyInFlight -> Verifying -> {Verified | Mismatched | Failed}`;
//! the terminal state reaches the caller as `Ok(LoadReport)` or a
//! [`LoadError`] naming the phase that failed. The bank never retries on
//! its own.

use std::io::{Read, Write};

use log::{debug, info, warn};

use crate::config::BankConfig;
use crate::digest::{self, ContentDigest, CHUNK_SIZE};
use crate::error::{LoadError, Result};
use crate::slot::{Slot, SlotFormat};
use crate::store::{SlotRegion, SlotStore};
use crate::title;

/// First two little-endian words of a well-formed UF2 block
const UF2_MAGIC_START0: u32 = 0x0A32_4655;
const UF2_MAGIC_START1: u32 = 0x9E5D_5157;

/// Callback for progress reporting during load and verify operations
///
/// Byte counts are cumulative within a phase. Use [`NoProgress`] when no
/// reporting is needed.
pub trait LoadProgress {
    /// Called when the copy phase starts
    fn copying(&mut self, index: usize, total_bytes: u64);

    /// Called after each copied chunk
    fn copy_progress(&mut self, bytes_copied: u64);

    /// Called when the verify phase starts; `total_bytes` covers both
    /// regions to be digested
    fn verifying(&mut self, index: usize, total_bytes: u64);

    /// Called as verification reads are digested
    fn verify_progress(&mut self, bytes_hashed: u64);

    /// Called when a load completes successfully
    fn complete(&mut self, report: &LoadReport);
}

/// A no-op progress reporter
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn copying(&mut self, _index: usize, _total_bytes: u64) {}
    fn copy_progress(&mut self, _bytes_copied: u64) {}
    fn verifying(&mut self, _index: usize, _total_bytes: u64) {}
    fn verify_progress(&mut self, _bytes_hashed: u64) {}
    fn complete(&mut self, _report: &LoadReport) {}
}

/// Outcome of a successful load
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Slot that was loaded
    pub index: usize,
    /// Bytes copied onto the active image
    pub bytes_copied: u64,
    /// Digest shared by the slot and the active image after the copy
    pub digest: ContentDigest,
}

/// A fixed table of slots over one storage backend
///
/// # Example
///
/// ```ignore
/// use gameslots_core::bank::SlotBank;
/// use gameslots_core::config::BankConfig;
///
/// let mut bank = SlotBank::new(store, BankConfig::default());
/// bank.refresh();
/// let report = bank.load(0)?;
/// println!("verified sha256 {}", report.digest);
/// ```
pub struct SlotBank<S: SlotStore> {
    store: S,
    config: BankConfig,
    slots: Vec<Slot>,
}

impl<S: SlotStore> SlotBank<S> {
    /// Create a bank over `store`
    ///
    /// The table starts all-empty until the first
    /// [`refresh`](SlotBank::refresh).
    pub fn new(store: S, config: BankConfig) -> Self {
        let slots = (0..config.slot_count).map(Slot::empty).collect();
        Self {
            store,
            config,
            slots,
        }
    }

    /// The current slot table, ordered by index
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Bank configuration
    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Shared access to the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Rebuild the slot table from storage
    ///
    /// The table is replaced wholesale; callers never observe a partially
    /// rebuilt one. Probe and metadata failures degrade the affected slot
    /// with a warning instead of aborting the rebuild, so one bad slot
    /// cannot hide the others.
    pub fn refresh(&mut self) -> &[Slot] {
        let mut table = Vec::with_capacity(self.config.slot_count);
        for index in 0..self.config.slot_count {
            table.push(self.scan_slot(index));
        }
        self.slots = table;
        &self.slots
    }

    fn scan_slot(&self, index: usize) -> Slot {
        let region = match self.store.probe(index) {
            Ok(Some(region)) => region,
            Ok(None) => return Slot::empty(index),
            Err(err) => {
                warn!("slot {}: probe failed, treating as empty: {}", index, err);
                return Slot::empty(index);
            }
        };
        if region.size == 0 {
            return Slot::empty(index);
        }

        let format = SlotFormat::classify(&region.name);
        debug!(
            "slot {}: {} ({} bytes, {})",
            index, region.name, region.size, format
        );
        let resolved = if format.scans_for_title() {
            self.scan_title(index, &region)
        } else {
            None
        };
        Slot::populated(index, format, region.size, resolved)
    }

    fn scan_title(&self, index: usize, region: &SlotRegion) -> Option<String> {
        let window = self.config.title_scan_window.min(region.size);
        let header = match self.store.read_prefix(index, window) {
            Ok(header) => header,
            Err(err) => {
                warn!(
                    "slot {}: header window unreadable, using fallback title: {}",
                    index, err
                );
                return None;
            }
        };
        check_uf2_magic(index, &header);
        title::resolve_title(&header).map(|resolved| {
            debug!(
                "slot {}: title {:?} via {:?}",
                index, resolved.title, resolved.source
            );
            resolved.title
        })
    }

    /// Copy slot `index` onto the active image and verify the transfer
    ///
    /// Shorthand for [`load_with_progress`](SlotBank::load_with_progress)
    /// with no progress reporting.
    pub fn load(&mut self, index: usize) -> Result<LoadReport> {
        self.load_with_progress(index, &mut NoProgress)
    }

    /// Copy slot `index` onto the active image, then verify by digesting
    /// both regions from a fresh read
    ///
    /// The copy fully replaces the active image content. A read failure
    /// for a slot the table believed non-empty (the backing region shrank
    /// or vanished since the last refresh) surfaces as
    /// [`LoadError::CopyIo`].
    ///
    /// # Errors
    ///
    /// * [`LoadError::InvalidIndex`] - index outside the bank; nothing is
    ///   copied
    /// * [`LoadError::EmptySlot`] - no backing image; the active image is
    ///   untouched
    /// * [`LoadError::CopyIo`] - storage failed mid-copy; the active image
    ///   is left indeterminate
    /// * [`LoadError::VerifyIo`] - a region could not be re-read for
    ///   digesting
    /// * [`LoadError::Mismatched`] - both digests computed but differ
    pub fn load_with_progress<P: LoadProgress + ?Sized>(
        &mut self,
        index: usize,
        progress: &mut P,
    ) -> Result<LoadReport> {
        self.ensure_in_range(index)?;
        if self.slots[index].is_empty() {
            return Err(LoadError::EmptySlot { index });
        }
        info!(
            "loading slot {} ({}, {} bytes)",
            index, self.slots[index].title, self.slots[index].size
        );

        progress.copying(index, self.slots[index].size);
        let bytes_copied = self
            .copy_to_active(index, progress)
            .map_err(|err| LoadError::CopyIo { index, source: err })?;
        debug!("slot {}: copied {} bytes to the active image", index, bytes_copied);

        let digest = self.verify_with_progress(index, progress)?;
        info!("slot {}: verified ({})", index, digest);

        let report = LoadReport {
            index,
            bytes_copied,
            digest,
        };
        progress.complete(&report);
        Ok(report)
    }

    /// Digest slot `index` and the active image independently and compare
    ///
    /// Both regions are re-read in full; nothing is trusted from earlier
    /// operations. Returns the shared digest on success.
    ///
    /// # Errors
    ///
    /// [`LoadError::VerifyIo`] when either region cannot be read,
    /// [`LoadError::Mismatched`] when the digests differ. Range and
    /// emptiness preconditions match [`load`](SlotBank::load).
    pub fn verify(&self, index: usize) -> Result<ContentDigest> {
        self.verify_with_progress(index, &mut NoProgress)
    }

    /// [`verify`](SlotBank::verify) with progress reporting
    pub fn verify_with_progress<P: LoadProgress + ?Sized>(
        &self,
        index: usize,
        progress: &mut P,
    ) -> Result<ContentDigest> {
        self.ensure_in_range(index)?;
        if self.slots[index].is_empty() {
            return Err(LoadError::EmptySlot { index });
        }
        progress.verifying(index, self.slots[index].size * 2);
        let mut hashed = 0u64;

        let mut slot_reader = self
            .store
            .open_slot(index)
            .map_err(|err| LoadError::VerifyIo { index, source: err })?;
        let expected = digest::digest_reader_observed(&mut *slot_reader, &mut |n| {
            hashed += n;
            progress.verify_progress(hashed);
        })
        .map_err(|err| LoadError::VerifyIo { index, source: err })?;

        let mut active_reader = self
            .store
            .read_active()
            .map_err(|err| LoadError::VerifyIo { index, source: err })?;
        let actual = digest::digest_reader_observed(&mut *active_reader, &mut |n| {
            hashed += n;
            progress.verify_progress(hashed);
        })
        .map_err(|err| LoadError::VerifyIo { index, source: err })?;

        if expected != actual {
            warn!(
                "slot {}: digest mismatch (expected {}, got {})",
                index, expected, actual
            );
            return Err(LoadError::Mismatched {
                index,
                expected,
                actual,
            });
        }
        Ok(expected)
    }

    /// Load every slot in order, collecting per-slot outcomes
    ///
    /// A failure in one slot never aborts the remainder; empty slots
    /// report [`LoadError::EmptySlot`] like any other outcome.
    pub fn load_all(&mut self) -> Vec<(usize, Result<LoadReport>)> {
        self.load_all_with_progress(&mut NoProgress)
    }

    /// [`load_all`](SlotBank::load_all) with progress reporting
    pub fn load_all_with_progress<P: LoadProgress + ?Sized>(
        &mut self,
        progress: &mut P,
    ) -> Vec<(usize, Result<LoadReport>)> {
        let mut outcomes = Vec::with_capacity(self.config.slot_count);
        for index in 0..self.config.slot_count {
            let outcome = self.load_with_progress(index, &mut *progress);
            if let Err(err) = &outcome {
                debug!("slot {}: {}", index, err);
            }
            outcomes.push((index, outcome));
        }
        outcomes
    }

    fn ensure_in_range(&self, index: usize) -> Result<()> {
        if index >= self.config.slot_count {
            return Err(LoadError::InvalidIndex {
                index,
                slot_count: self.config.slot_count,
            });
        }
        Ok(())
    }

    fn copy_to_active<P: LoadProgress + ?Sized>(
        &mut self,
        index: usize,
        progress: &mut P,
    ) -> std::io::Result<u64> {
        let mut source = self.store.open_slot(index)?;
        let mut dest = self.store.open_active()?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut copied = 0u64;
        loop {
            let n = source.read(&mut buf)?;
            if n == 0 {
                break;
            }
            dest.write_all(&buf[..n])?;
            copied += n as u64;
            progress.copy_progress(copied);
        }
        dest.flush()?;
        Ok(copied)
    }
}

/// Advisory check that a `.uf2` header window starts with the UF2 block
/// magic. A mismatch only logs; classification stays extension-priority.
fn check_uf2_magic(index: usize, header: &[u8]) {
    if header.len() < 8 {
        return;
    }
    let word0 = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let word1 = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if word0 != UF2_MAGIC_START0 || word1 != UF2_MAGIC_START1 {
        warn!(
            "slot {}: .uf2 image does not start with a UF2 block header",
            index
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{self, Cursor};

    /// In-memory store with injectable failures
    #[derive(Default)]
    struct MemStore {
        regions: HashMap<usize, (String, Vec<u8>)>,
        active: Vec<u8>,
        fail_probe: Option<usize>,
        fail_active_reads: bool,
    }

    impl MemStore {
        fn with_region(mut self, index: usize, name: &str, data: &[u8]) -> Self {
            self.regions.insert(index, (name.to_string(), data.to_vec()));
            self
        }
    }

    impl SlotStore for MemStore {
        fn probe(&self, index: usize) -> io::Result<Option<SlotRegion>> {
            if self.fail_probe == Some(index) {
                return Err(io::Error::new(io::ErrorKind::Other, "injected probe failure"));
            }
            Ok(self.regions.get(&index).map(|(name, data)| SlotRegion {
                name: name.clone(),
                size: data.len() as u64,
            }))
        }

        fn open_slot(&self, index: usize) -> io::Result<Box<dyn Read>> {
            match self.regions.get(&index) {
                Some((_, data)) => Ok(Box::new(Cursor::new(data.clone()))),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "no such region")),
            }
        }

        fn open_active(&mut self) -> io::Result<Box<dyn Write + '_>> {
            self.active.clear();
            Ok(Box::new(&mut self.active))
        }

        fn read_active(&self) -> io::Result<Box<dyn Read>> {
            if self.fail_active_reads {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "injected active read failure",
                ));
            }
            Ok(Box::new(Cursor::new(self.active.clone())))
        }
    }

    fn scenario_bank() -> SlotBank<MemStore> {
        let store = MemStore::default()
            .with_region(0, "slot0.uf2", br#"{"name":"Asteroids"}"#)
            .with_region(2, "slot2.uf2", &[0xde, 0xad, 0xbe, 0xef]);
        let mut bank = SlotBank::new(store, BankConfig::default());
        bank.refresh();
        bank
    }

    #[test]
    fn test_refresh_scenario_titles() {
        let bank = scenario_bank();
        let titles: Vec<&str> = bank.slots().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Asteroids (UF2)", "Empty", "Game 2 (UF2)", "Empty"]);
        assert_eq!(bank.slots()[0].format, SlotFormat::Uf2);
        assert!(bank.slots()[1].is_empty());
        assert_eq!(bank.slots()[2].size, 4);
    }

    #[test]
    fn test_load_invalid_index_copies_nothing() {
        let mut bank = scenario_bank();
        bank.store_mut().active = b"before".to_vec();
        match bank.load(7) {
            Err(LoadError::InvalidIndex {
                index: 7,
                slot_count: 4,
            }) => {}
            other => panic!("expected InvalidIndex, got {:?}", other),
        }
        assert_eq!(bank.store().active, b"before");
    }

    #[test]
    fn test_load_empty_slot_leaves_active_untouched() {
        let mut bank = scenario_bank();
        bank.store_mut().active = b"before".to_vec();
        match bank.load(1) {
            Err(LoadError::EmptySlot { index: 1 }) => {}
            other => panic!("expected EmptySlot, got {:?}", other),
        }
        assert_eq!(bank.store().active, b"before");
    }

    #[test]
    fn test_load_round_trip() {
        let mut bank = scenario_bank();
        let report = bank.load(0).unwrap();
        assert_eq!(report.index, 0);
        assert_eq!(report.bytes_copied, br#"{"name":"Asteroids"}"#.len() as u64);
        assert_eq!(bank.store().active, br#"{"name":"Asteroids"}"#);
        assert_eq!(bank.verify(0).unwrap(), report.digest);
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut bank = scenario_bank();
        let first = bank.load(2).unwrap();
        let second = bank.load(2).unwrap();
        assert_eq!(first.digest, second.digest);
        assert_eq!(bank.store().active, [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_load_overwrites_longer_previous_content() {
        let mut bank = scenario_bank();
        bank.store_mut().active = vec![0xee; 1000];
        bank.load(2).unwrap();
        assert_eq!(bank.store().active, [0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_load_all_reports_per_slot_outcomes() {
        let mut bank = scenario_bank();
        let outcomes = bank.load_all();
        assert_eq!(outcomes.len(), 4);
        assert!(matches!(outcomes[0], (0, Ok(_))));
        assert!(matches!(outcomes[1], (1, Err(LoadError::EmptySlot { .. }))));
        assert!(matches!(outcomes[2], (2, Ok(_))));
        assert!(matches!(outcomes[3], (3, Err(LoadError::EmptySlot { .. }))));
    }

    #[test]
    fn test_deleted_region_is_copy_error() {
        let mut bank = scenario_bank();
        bank.store_mut().regions.remove(&0);
        match bank.load(0) {
            Err(LoadError::CopyIo { index: 0, .. }) => {}
            other => panic!("expected CopyIo, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_active_is_verify_error() {
        let mut bank = scenario_bank();
        bank.load(0).unwrap();

        bank.store_mut().fail_active_reads = true;
        match bank.verify(0) {
            Err(LoadError::VerifyIo { index: 0, .. }) => {}
            other => panic!("expected VerifyIo, got {:?}", other),
        }

        // The in-load verification hits the same distinct error: the copy
        // itself succeeds, then the read-back fails.
        match bank.load(0) {
            Err(LoadError::VerifyIo { index: 0, .. }) => {}
            other => panic!("expected VerifyIo, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupted_active_is_mismatch() {
        let mut bank = scenario_bank();
        bank.load(0).unwrap();
        bank.store_mut().active[0] ^= 0xff;
        match bank.verify(0) {
            Err(LoadError::Mismatched {
                index: 0,
                expected,
                actual,
            }) => assert_ne!(expected, actual),
            other => panic!("expected Mismatched, got {:?}", other),
        }
    }

    #[test]
    fn test_probe_failure_degrades_one_slot() {
        let mut store = MemStore::default()
            .with_region(0, "slot0.bin", b"aaaa")
            .with_region(1, "slot1.bin", b"bbbb");
        store.fail_probe = Some(0);
        let mut bank = SlotBank::new(store, BankConfig::default());
        bank.refresh();
        assert!(bank.slots()[0].is_empty());
        assert_eq!(bank.slots()[1].title, "Game 1 (BIN)");
    }

    #[test]
    fn test_zero_size_region_is_empty() {
        let store = MemStore::default().with_region(0, "slot0.uf2", b"");
        let mut bank = SlotBank::new(store, BankConfig::default());
        bank.refresh();
        assert!(bank.slots()[0].is_empty());
    }

    #[test]
    fn test_bin_slots_are_not_scanned_for_titles() {
        let store = MemStore::default().with_region(1, "slot1.bin", br#"{"name":"Sneaky"}"#);
        let mut bank = SlotBank::new(store, BankConfig::default());
        bank.refresh();
        assert_eq!(bank.slots()[1].title, "Game 1 (BIN)");
    }

    #[test]
    fn test_unknown_extension_classification() {
        let store = MemStore::default().with_region(0, "slot0.dat", br#"{"name":"Hidden"}"#);
        let mut bank = SlotBank::new(store, BankConfig::default());
        bank.refresh();
        assert_eq!(bank.slots()[0].format, SlotFormat::Unknown);
        assert_eq!(bank.slots()[0].title, "Game 0 (Unknown)");
    }

    #[test]
    fn test_title_window_is_capped() {
        let mut data = vec![0u8; 64];
        data.extend_from_slice(br#"{"name":"Late"}"#);

        // Metadata past the configured window is invisible to the resolver.
        let store = MemStore::default().with_region(0, "slot0.uf2", &data);
        let mut config = BankConfig::default();
        config.title_scan_window = 64;
        let mut bank = SlotBank::new(store, config);
        bank.refresh();
        assert_eq!(bank.slots()[0].title, "Game 0 (UF2)");

        let store = MemStore::default().with_region(0, "slot0.uf2", &data);
        let mut bank = SlotBank::new(store, BankConfig::default());
        bank.refresh();
        assert_eq!(bank.slots()[0].title, "Late (UF2)");
    }

    #[test]
    fn test_custom_slot_count() {
        let store = MemStore::default().with_region(6, "slot6.bin", b"payload");
        let mut bank = SlotBank::new(store, BankConfig::new(8));
        bank.refresh();
        assert_eq!(bank.slots().len(), 8);
        assert_eq!(bank.slots()[6].title, "Game 6 (BIN)");
        assert!(bank.load(6).is_ok());
        match bank.load(8) {
            Err(LoadError::InvalidIndex { slot_count: 8, .. }) => {}
            other => panic!("expected InvalidIndex, got {:?}", other),
        }
    }
}
