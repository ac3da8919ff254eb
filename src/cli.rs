//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gameslots")]
#[command(author, version, about = "Game image slot manager", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding the slot files and the active image
    #[arg(short, long, default_value = "qspi_slots", global = true)]
    pub bank: PathBuf,

    /// Number of slots in the bank
    #[arg(long, default_value_t = 4, global = true)]
    pub slots: usize,

    /// Filename of the active image inside the bank directory
    #[arg(long, default_value = "internal_flash.bin", global = true)]
    pub active: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List slots with format, size and resolved title
    List {
        /// Print the slot table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy a slot onto the active image and verify the transfer
    Load {
        /// Slot index to load
        index: usize,
    },

    /// Load every slot in order, reporting per-slot outcomes
    LoadAll,

    /// Check that a slot and the active image hold identical content
    Verify {
        /// Slot index to verify
        index: usize,
    },
}
