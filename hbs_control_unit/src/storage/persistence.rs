//! Inventory snapshot persistence.
//!
//! The whole grid is written after every mutation, using bincode. Writes go
//! to a sibling temporary file that is then renamed over the snapshot, so a
//! crash mid-write leaves the previous snapshot intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use hbs_common::consts::SLOT_COUNT;
use hbs_common::fault::Fault;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::inventory::StorageInventory;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system error.
    #[error("storage file I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("storage file encoding: {0}")]
    Codec(#[from] bincode::Error),

    /// Snapshot decoded but is not a valid grid.
    #[error("storage file corrupt: {0}")]
    Corrupt(String),
}

impl From<StorageError> for Fault {
    fn from(err: StorageError) -> Self {
        Fault::StorageIo(err.to_string())
    }
}

/// How the inventory came to be at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read from an existing snapshot.
    Loaded,
    /// No snapshot: 50 free slots created and persisted.
    Created,
}

impl LoadOrigin {
    /// Startup message published on the command transport.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Loaded => "storage_loaded",
            Self::Created => "storage_created",
        }
    }
}

/// On-disk snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Format version.
    pub version: u32,
    /// The grid.
    pub inventory: StorageInventory,
}

impl InventorySnapshot {
    /// Current snapshot format version.
    pub const CURRENT_VERSION: u32 = 1;
}

/// Snapshot file manager.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Manager for the snapshot at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole grid.
    pub fn save(&self, inventory: &StorageInventory) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = InventorySnapshot {
            version: InventorySnapshot::CURRENT_VERSION,
            inventory: inventory.clone(),
        };
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            bincode::serialize_into(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            occupied = inventory.occupied_count(),
            "Inventory saved"
        );
        Ok(())
    }

    /// Read the grid.
    pub fn load(&self) -> Result<StorageInventory, StorageError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let snapshot: InventorySnapshot = bincode::deserialize_from(reader)?;

        if snapshot.version != InventorySnapshot::CURRENT_VERSION {
            return Err(StorageError::Corrupt(format!(
                "version {} (expected {})",
                snapshot.version,
                InventorySnapshot::CURRENT_VERSION
            )));
        }
        let inventory = snapshot.inventory;
        if inventory.len() != SLOT_COUNT as usize {
            return Err(StorageError::Corrupt(format!(
                "{} slots (expected {SLOT_COUNT})",
                inventory.len()
            )));
        }
        if let Some((n, _)) = inventory.iter().find(|(_, s)| !s.is_consistent()) {
            return Err(StorageError::Corrupt(format!(
                "slot {n} timestamp does not match occupancy"
            )));
        }

        info!(
            path = %self.path.display(),
            occupied = inventory.occupied_count(),
            "Inventory loaded"
        );
        Ok(inventory)
    }

    /// Load the snapshot, or create and persist 50 free slots when none
    /// exists.
    pub fn load_or_create(&self) -> Result<(StorageInventory, LoadOrigin), StorageError> {
        if self.path.exists() {
            return Ok((self.load()?, LoadOrigin::Loaded));
        }
        info!(path = %self.path.display(), "No inventory snapshot, creating");
        let inventory = StorageInventory::new();
        self.save(&inventory)?;
        Ok((inventory, LoadOrigin::Created))
    }
}
