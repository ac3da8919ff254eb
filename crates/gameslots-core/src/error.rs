//! Error types for the load/verify pipeline

use std::io;
use thiserror::Error;

use crate::digest::ContentDigest;

/// Errors from the slot bank's load and verify operations
///
/// Title resolution never produces an error; a missing title is a normal
/// outcome covered by the deterministic fallback name.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Requested slot index is outside the configured bank
    #[error("Slot index {index} out of range (bank has {slot_count} slots)")]
    InvalidIndex {
        /// The index that was requested
        index: usize,
        /// Number of slots in the bank
        slot_count: usize,
    },

    /// Requested slot has no backing image
    #[error("Slot {index} is empty")]
    EmptySlot {
        /// The index that was requested
        index: usize,
    },

    /// Storage failed while copying the slot onto the active image
    ///
    /// The active image content is indeterminate after this error.
    #[error("Copy of slot {index} to the active image failed: {source}")]
    CopyIo {
        /// Slot being copied
        index: usize,
        /// Underlying storage error
        #[source]
        source: io::Error,
    },

    /// Verification failed to re-read the slot or the active image
    ///
    /// Distinct from [`LoadError::Mismatched`]: the digests were never
    /// compared because one region could not be read.
    #[error("Verification of slot {index} failed to read back a region: {source}")]
    VerifyIo {
        /// Slot being verified
        index: usize,
        /// Underlying storage error
        #[source]
        source: io::Error,
    },

    /// Both digests computed successfully but differ
    #[error("Digest mismatch for slot {index}: expected {expected}, got {actual}")]
    Mismatched {
        /// Slot being verified
        index: usize,
        /// Digest of the slot's backing image
        expected: ContentDigest,
        /// Digest of the active image
        actual: ContentDigest,
    },
}

/// Result type for slot bank operations
pub type Result<T> = std::result::Result<T, LoadError>;
