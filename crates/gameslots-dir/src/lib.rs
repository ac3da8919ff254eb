//! Directory-backed slot storage
//!
//! Maps a slot bank onto plain files in one directory: slot `N` is
//! backed by `slot<N>.uf2` or `slot<N>.bin`, and the active image is a
//! single file (`internal_flash.bin` by default) rewritten in place on
//! every load.
//!
//! # Example
//!
//! ```ignore
//! use gameslots_core::bank::SlotBank;
//! use gameslots_core::config::BankConfig;
//! use gameslots_dir::{DirStore, DirStoreConfig};
//!
//! let store = DirStore::open(DirStoreConfig::new("qspi_slots"))?;
//! let mut bank = SlotBank::new(store, BankConfig::default());
//! for slot in bank.refresh() {
//!     println!("{}: {}", slot.index, slot.title);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod store;

// Re-exports
pub use error::{DirStoreError, Result};
pub use store::{DirStore, DirStoreConfig};
