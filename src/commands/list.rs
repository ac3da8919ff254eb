//! List command implementation

use gameslots_core::bank::SlotBank;
use gameslots_core::store::SlotStore;

/// Print the slot table, either as a column view or as JSON
pub fn run_list<S: SlotStore>(
    bank: &SlotBank<S>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(bank.slots())?);
        return Ok(());
    }

    println!("{:<5} {:<8} {:>10}  {}", "Slot", "Format", "Size", "Title");
    println!("{}", "-".repeat(60));

    for slot in bank.slots() {
        println!(
            "{:<5} {:<8} {:>10}  {}",
            slot.index,
            slot.format.tag(),
            format_size(slot.size),
            slot.title
        );
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
