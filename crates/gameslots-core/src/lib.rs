//! gameslots-core - Core library for the gameslots bank manager
//!
//! This crate owns the slot model and the two components everything else is
//! built on:
//!
//! - The **title resolver** ([`title`]) extracts a display name from the
//!   header bytes of an image using an ordered chain of heuristics over
//!   untrusted content. Malformed input never fails a scan; it falls through
//!   to the next heuristic.
//! - The **slot bank** ([`bank`]) enumerates a fixed table of slots from a
//!   [`store::SlotStore`], classifies each backing image by extension, and
//!   runs the load/verify pipeline onto the single active image.
//!
//! Storage is abstracted behind the [`store::SlotStore`] trait so the same
//! bank logic runs over a directory of files (the `gameslots-dir` crate) or
//! an in-memory store in tests.
//!
//! # Example
//!
//! ```ignore
//! use gameslots_core::bank::SlotBank;
//! use gameslots_core::config::BankConfig;
//!
//! let mut bank = SlotBank::new(store, BankConfig::default());
//! for slot in bank.refresh() {
//!     println!("{}: {} ({} bytes)", slot.index, slot.title, slot.size);
//! }
//! let report = bank.load(0)?;
//! println!("verified sha256 {}", report.digest);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bank;
pub mod config;
pub mod digest;
pub mod error;
pub mod slot;
pub mod store;
pub mod title;

pub use error::{LoadError, Result};
