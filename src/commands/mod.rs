//! CLI command implementations
//!
//! Commands operate on a [`SlotBank`](gameslots_core::bank::SlotBank)
//! through the [`SlotStore`](gameslots_core::store::SlotStore) trait, so
//! the storage backend never leaks into the command logic.

mod list;
mod load;

pub use list::run_list;
pub use load::{run_load, run_load_all, run_verify};
