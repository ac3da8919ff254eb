//! Slot bank layout over a plain directory
//!
//! Slot `N` resolves to the first non-empty regular file among
//! `slot<N>.uf2` and `slot<N>.bin` under the bank root. The active image
//! lives beside them and is truncated and rewritten on every load.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use log::debug;

use gameslots_core::store::{SlotRegion, SlotStore};

use crate::error::{DirStoreError, Result};

/// Slot file extensions in resolution order
const SLOT_EXTENSIONS: [&str; 2] = ["uf2", "bin"];

/// Layout of a directory-backed bank
///
/// Slot filenames follow the fixed `slot{index}.{ext}` convention; only
/// the root directory and the active image name vary per store.
#[derive(Debug, Clone)]
pub struct DirStoreConfig {
    /// Directory holding the slot files and the active image
    pub root: PathBuf,
    /// Filename of the active image inside the root
    pub active_name: String,
}

impl DirStoreConfig {
    /// Layout rooted at `root` with the conventional active image name
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            active_name: "internal_flash.bin".to_string(),
        }
    }
}

/// Slot storage backed by files in one directory
pub struct DirStore {
    config: DirStoreConfig,
}

impl DirStore {
    /// Open a directory store, validating that the root exists
    ///
    /// Slot files are not required to exist; missing ones simply probe
    /// as empty slots.
    pub fn open(config: DirStoreConfig) -> Result<Self> {
        if !config.root.exists() {
            return Err(DirStoreError::RootNotFound {
                path: config.root.clone(),
            });
        }
        if !config.root.is_dir() {
            return Err(DirStoreError::NotADirectory {
                path: config.root.clone(),
            });
        }
        debug!("opened slot bank at {}", config.root.display());
        Ok(Self { config })
    }

    fn slot_path(&self, index: usize, extension: &str) -> PathBuf {
        self.config.root.join(format!("slot{}.{}", index, extension))
    }

    fn active_path(&self) -> PathBuf {
        self.config.root.join(&self.config.active_name)
    }

    /// First extension candidate backed by a non-empty regular file
    fn resolve(&self, index: usize) -> io::Result<Option<(PathBuf, u64)>> {
        for extension in SLOT_EXTENSIONS {
            let path = self.slot_path(index, extension);
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() && meta.len() > 0 => {
                    return Ok(Some((path, meta.len())));
                }
                Ok(_) => {
                    debug!(
                        "skipping {}: empty or not a regular file",
                        path.display()
                    );
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}

impl SlotStore for DirStore {
    fn probe(&self, index: usize) -> io::Result<Option<SlotRegion>> {
        Ok(self.resolve(index)?.map(|(path, size)| SlotRegion {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size,
        }))
    }

    fn open_slot(&self, index: usize) -> io::Result<Box<dyn Read>> {
        match self.resolve(index)? {
            Some((path, _)) => Ok(Box::new(File::open(path)?)),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Slot {} has no backing file", index),
            )),
        }
    }

    fn open_active(&mut self) -> io::Result<Box<dyn Write + '_>> {
        let path = self.active_path();
        debug!("rewriting active image at {}", path.display());
        Ok(Box::new(File::create(path)?))
    }

    fn read_active(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(self.active_path())?))
    }
}
