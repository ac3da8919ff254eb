//! gameslots - game image slot manager
//!
//! Discovers game images stored in numbered slot files, resolves a
//! display title for each by scanning untrusted image content, and
//! copies a chosen slot onto the active firmware image with SHA-256
//! verification of the transfer.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use gameslots_core::bank::SlotBank;
use gameslots_core::config::BankConfig;
use gameslots_dir::{DirStore, DirStoreConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let mut config = DirStoreConfig::new(&cli.bank);
    config.active_name = cli.active.clone();

    let store = match DirStore::open(config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open slot bank: {}", e);
            std::process::exit(1);
        }
    };

    let mut bank = SlotBank::new(store, BankConfig::new(cli.slots));
    bank.refresh();

    let result = match cli.command {
        Commands::List { json } => commands::run_list(&bank, json),
        Commands::Load { index } => commands::run_load(&mut bank, index),
        Commands::LoadAll => commands::run_load_all(&mut bank),
        Commands::Verify { index } => commands::run_verify(&bank, index),
    };

    result
}
