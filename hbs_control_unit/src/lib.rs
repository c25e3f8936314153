//! # HBS Control Unit Library
//!
//! Motion control and inventory management for the high-bay storage rack.
//! Every operation runs to completion on the calling thread, polling the
//! backplane once per clock tick, and returns a [`MoveOutcome`].
//!
//! ## Layers
//!
//! 1. **Axis engine** - linear X and Z, discrete Y, all driven by one
//!    poll/stall/emergency-stop/settle loop
//! 2. **Coordinated move** - X and Z in one shared loop
//! 3. **Box transfer** - store, retrieve, fetch and drop choreographies
//! 4. **Storage** - 50-slot inventory with snapshot persistence
//! 5. **Orchestrator** - user operations coupling transfers and inventory
//!
//! [`MoveOutcome`]: hbs_common::fault::MoveOutcome

pub mod motion;
pub mod orchestrator;
pub mod safety;
pub mod storage;
pub mod transfer;

pub use motion::Carriage;
pub use orchestrator::StorageOrchestrator;
pub use storage::{InventorySnapshot, LoadOrigin, SnapshotStore, StorageError, StorageInventory};
