//! Bank configuration

use crate::title;

/// Slot count of the conventional four-slot bank
pub const DEFAULT_SLOT_COUNT: usize = 4;

/// Configuration injected into a [`SlotBank`](crate::bank::SlotBank) at
/// construction
#[derive(Debug, Clone)]
pub struct BankConfig {
    /// Number of slots in the bank
    pub slot_count: usize,
    /// Header window handed to the title resolver, in bytes
    pub title_scan_window: u64,
}

impl BankConfig {
    /// Configuration for a bank with `slot_count` slots and the default
    /// scan window
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            title_scan_window: title::TITLE_SCAN_WINDOW,
        }
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}
