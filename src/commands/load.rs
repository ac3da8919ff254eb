//! Load and verify command implementations

use indicatif::{ProgressBar, ProgressStyle};

use gameslots_core::bank::{LoadProgress, LoadReport, SlotBank};
use gameslots_core::error::LoadError;
use gameslots_core::store::SlotStore;

/// Create a progress bar with a phase label baked into the template
fn create_progress_bar_with_phase(
    total: u64,
    phase: &str,
) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Progress reporter using indicatif progress bars
pub struct ConsoleProgress {
    current_bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { current_bar: None }
    }

    fn create_bar(&mut self, total: u64, phase: &'static str) {
        let pb = create_progress_bar_with_phase(total, phase)
            .unwrap_or_else(|_| ProgressBar::new(total));
        self.current_bar = Some(pb);
    }

    fn finish(&mut self, message: &str) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadProgress for ConsoleProgress {
    fn copying(&mut self, _index: usize, total_bytes: u64) {
        self.create_bar(total_bytes, "Copying");
    }

    fn copy_progress(&mut self, bytes_copied: u64) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_copied);
        }
    }

    fn verifying(&mut self, _index: usize, total_bytes: u64) {
        self.finish("Copy complete");
        self.create_bar(total_bytes, "Verifying");
    }

    fn verify_progress(&mut self, bytes_hashed: u64) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_hashed);
        }
    }

    fn complete(&mut self, _report: &LoadReport) {
        self.finish("Verify complete");
    }
}

/// Run the load command for a single slot
pub fn run_load<S: SlotStore>(
    bank: &mut SlotBank<S>,
    index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(slot) = bank.slots().get(index) {
        println!("Loading slot {}: {}", index, slot.title);
    }

    let mut progress = ConsoleProgress::new();
    let report = bank.load_with_progress(index, &mut progress)?;

    println!(
        "Loaded slot {}: {} bytes copied, sha256 {}",
        report.index, report.bytes_copied, report.digest
    );
    Ok(())
}

/// Run the load command over every slot, continuing past failures
pub fn run_load_all<S: SlotStore>(
    bank: &mut SlotBank<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcomes = {
        let mut progress = ConsoleProgress::new();
        bank.load_all_with_progress(&mut progress)
    };

    let mut failures = 0;
    for (index, outcome) in &outcomes {
        match outcome {
            Ok(report) => println!(
                "Slot {}: verified ({} bytes, sha256 {})",
                index, report.bytes_copied, report.digest
            ),
            Err(LoadError::EmptySlot { .. }) => println!("Slot {}: empty, skipped", index),
            Err(err) => {
                failures += 1;
                println!("Slot {}: failed: {}", index, err);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} slot(s) failed to load", failures).into());
    }
    Ok(())
}

/// Run the verify command for a single slot
pub fn run_verify<S: SlotStore>(
    bank: &SlotBank<S>,
    index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut progress = ConsoleProgress::new();
    let digest = bank.verify_with_progress(index, &mut progress)?;
    progress.finish("Verify complete");

    println!(
        "Slot {} and the active image match (sha256 {})",
        index, digest
    );
    Ok(())
}
