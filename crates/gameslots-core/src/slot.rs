//! Slot table types

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// Container format of a slot's backing image
///
/// Classification is extension-priority (see [`SlotFormat::classify`]),
/// never content-sniffed: a `.uf2` file that fails the UF2 magic check is
/// still a `Uf2` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotFormat {
    /// No backing region, or a zero-length one
    Empty,
    /// UF2 container; may carry embedded project metadata
    Uf2,
    /// Raw binary image, treated as opaque
    Bin,
    /// Backing region exists but its name matches no known extension
    Unknown,
}

impl SlotFormat {
    /// Classify a backing region by the extension of its name
    pub fn classify(name: &str) -> Self {
        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("uf2") => SlotFormat::Uf2,
            Some(ext) if ext.eq_ignore_ascii_case("bin") => SlotFormat::Bin,
            _ => SlotFormat::Unknown,
        }
    }

    /// Display tag used when composing slot titles
    pub fn tag(&self) -> &'static str {
        match self {
            SlotFormat::Empty => "Empty",
            SlotFormat::Uf2 => "UF2",
            SlotFormat::Bin => "BIN",
            SlotFormat::Unknown => "Unknown",
        }
    }

    /// Whether images of this format carry embedded title metadata
    ///
    /// Only UF2 images are scanned; BIN and unrecognized formats are
    /// opaque.
    pub fn scans_for_title(&self) -> bool {
        matches!(self, SlotFormat::Uf2)
    }
}

impl fmt::Display for SlotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One entry of the slot table
///
/// Identity is positional: exactly one `Slot` exists per index in
/// `[0, slot_count)`. The backing bytes stay with the storage
/// collaborator; a slot refers to them only by index.
#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    /// Positional identity within the bank
    pub index: usize,
    /// Container format of the backing image
    pub format: SlotFormat,
    /// Byte length of the backing image; zero iff the slot is empty
    pub size: u64,
    /// Display title
    pub title: String,
}

impl Slot {
    /// An empty slot at `index`
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            format: SlotFormat::Empty,
            size: 0,
            title: "Empty".to_string(),
        }
    }

    /// A populated slot
    ///
    /// Composes the display title from the resolved metadata title when one
    /// exists, else the deterministic `Game {index} ({format})` fallback.
    pub fn populated(
        index: usize,
        format: SlotFormat,
        size: u64,
        resolved: Option<String>,
    ) -> Self {
        let title = match resolved {
            Some(title) => format!("{} ({})", title, format.tag()),
            None => format!("Game {} ({})", index, format.tag()),
        };
        Self {
            index,
            format,
            size,
            title,
        }
    }

    /// Whether the slot has a backing image
    pub fn is_empty(&self) -> bool {
        self.format == SlotFormat::Empty
    }
}
