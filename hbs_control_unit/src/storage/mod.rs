//! Storage places.
//!
//! - [`inventory`] - The 50-slot occupancy grid and the in-transit marker
//! - [`persistence`] - Whole-grid bincode snapshots

pub mod inventory;
pub mod persistence;

pub use inventory::{InTransit, OCCUPANCY_PREFIX, StorageInventory, StorageSlot};
pub use persistence::{InventorySnapshot, LoadOrigin, SnapshotStore, StorageError};
