//! Storage collaborator contract
//!
//! A [`SlotStore`] maps slot indices onto zero-or-one backing region each
//! and owns the single active image region. The bank never touches paths
//! or file handles directly; everything flows through this trait, which
//! keeps directory stores and in-memory test stores interchangeable.
//!
//! `std::io::Error` is the error currency. The bank wraps storage failures
//! with phase context (copy vs. verify) before they reach callers.

use std::io::{self, Read, Write};

/// The backing region a store selected for one slot index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRegion {
    /// Region name, e.g. `slot0.uf2`; drives format classification
    pub name: String,
    /// Region length in bytes
    pub size: u64,
}

/// Byte storage backing a slot bank
///
/// Implementations resolve each index per the fixed naming convention:
/// `slot{index}.uf2` preferred, else `slot{index}.bin`, the first existing
/// non-empty candidate winning. The active image is a single region with
/// truncate-then-overwrite write semantics; it carries no identity beyond
/// whatever was last written to it.
pub trait SlotStore {
    /// Resolve the backing region for `index`, if any
    fn probe(&self, index: usize) -> io::Result<Option<SlotRegion>>;

    /// Open the backing region of `index` for reading from the start
    fn open_slot(&self, index: usize) -> io::Result<Box<dyn Read>>;

    /// Open the active image for writing, truncating prior content
    fn open_active(&mut self) -> io::Result<Box<dyn Write + '_>>;

    /// Open the active image for reading
    fn read_active(&self) -> io::Result<Box<dyn Read>>;

    /// Read at most `max_len` bytes from the start of the backing region
    ///
    /// The default implementation reads through
    /// [`open_slot`](SlotStore::open_slot).
    fn read_prefix(&self, index: usize, max_len: u64) -> io::Result<Vec<u8>> {
        let mut header = Vec::new();
        self.open_slot(index)?
            .take(max_len)
            .read_to_end(&mut header)?;
        Ok(header)
    }
}
