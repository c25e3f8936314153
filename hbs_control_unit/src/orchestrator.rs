//! User-level storage operations.
//!
//! The [`StorageOrchestrator`] couples the box transfers of the
//! [`Carriage`] with the [`StorageInventory`]. Inventory and state checks
//! happen before any motion; the grid is mutated and persisted only after
//! the transfers succeeded.
//!
//! ## Rearrange and the in-transit marker
//!
//! `rearrange_box` clears the old slot and records an in-transit marker in
//! one persisted write once the box is on the fork. The new slot is occupied
//! and the marker cleared in one write once it is stored again. While a
//! marker exists every mutating operation fails with `BoxInTransit`, except
//! [`StorageOrchestrator::release_in_transit`].

use chrono::Utc;
use hbs_common::fault::{Fault, MoveOutcome, outcome_code};
use hbs_common::io::DigitalIo;
use hbs_common::time::Clock;
use hbs_common::types::{Axis, SlotCoordinate, SystemStatus, YPosition};
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::motion::Carriage;
use crate::storage::{SnapshotStore, StorageInventory};

/// Store/destore/rearrange front end of the rack.
pub struct StorageOrchestrator<I: DigitalIo, C: Clock> {
    carriage: Carriage<I, C>,
    inventory: StorageInventory,
    store: SnapshotStore,
}

impl<I: DigitalIo, C: Clock> StorageOrchestrator<I, C> {
    /// Orchestrator over an already loaded inventory.
    pub fn new(
        carriage: Carriage<I, C>,
        inventory: StorageInventory,
        store: SnapshotStore,
    ) -> Self {
        Self {
            carriage,
            inventory,
            store,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// The carriage.
    pub fn carriage(&self) -> &Carriage<I, C> {
        &self.carriage
    }

    /// The carriage, mutably.
    pub fn carriage_mut(&mut self) -> &mut Carriage<I, C> {
        &mut self.carriage
    }

    /// The occupancy grid.
    pub fn inventory(&self) -> &StorageInventory {
        &self.inventory
    }

    /// Operating status.
    pub fn status(&self) -> SystemStatus {
        self.carriage.status()
    }

    /// Live X column.
    pub fn x(&mut self) -> Option<u8> {
        self.carriage.x()
    }

    /// Live Y depth.
    pub fn y(&mut self) -> Option<YPosition> {
        self.carriage.y()
    }

    /// Live Z sub-position.
    pub fn z(&mut self) -> Option<u8> {
        self.carriage.z()
    }

    // ─── Initialization ─────────────────────────────────────────────

    /// Initialize X.
    pub fn init_x(&mut self) -> MoveOutcome {
        self.carriage.init_x()
    }

    /// Initialize Y, ending at DEFAULT.
    pub fn init_y(&mut self) -> MoveOutcome {
        self.carriage.init_y()
    }

    /// Initialize Z.
    pub fn init_z(&mut self) -> MoveOutcome {
        self.carriage.init_z()
    }

    // ─── Storage operations ─────────────────────────────────────────

    /// Take a box from the input dock and store it at `x`/`z_level`.
    pub fn store_box(&mut self, x: u8, z_level: u8) -> MoveOutcome {
        info!(x, z_level, "store_box");
        let outcome = self.try_store(x, z_level);
        log_result("store_box", &outcome);
        outcome
    }

    fn try_store(&mut self, x: u8, z_level: u8) -> MoveOutcome {
        let slot = self.validate(x, z_level)?;
        self.ensure_no_transit()?;
        if self.inventory.is_occupied(slot) {
            return self.carriage.fail(Fault::ShelfOccupied);
        }
        self.carriage.fetch_from_input()?;
        self.carriage.store_to_shelf(slot.x, slot.z_level)?;
        self.inventory.occupy(slot, Utc::now());
        self.persist()
    }

    /// Take the box at `x`/`z_level` to the output dock.
    pub fn destore_box(&mut self, x: u8, z_level: u8) -> MoveOutcome {
        info!(x, z_level, "destore_box");
        let outcome = self.try_destore(x, z_level);
        log_result("destore_box", &outcome);
        outcome
    }

    fn try_destore(&mut self, x: u8, z_level: u8) -> MoveOutcome {
        let slot = self.validate(x, z_level)?;
        self.ensure_no_transit()?;
        if !self.inventory.is_occupied(slot) {
            return self.carriage.fail(Fault::ShelfEmpty);
        }
        self.carriage.retrieve_from_shelf(slot.x, slot.z_level)?;
        self.carriage.drop_to_output()?;
        self.inventory.clear(slot);
        self.persist()
    }

    /// Move the box at `x`/`z_level` to `x_new`/`z_new`.
    pub fn rearrange_box(&mut self, x: u8, z_level: u8, x_new: u8, z_new: u8) -> MoveOutcome {
        info!(x, z_level, x_new, z_new, "rearrange_box");
        let outcome = self.try_rearrange(x, z_level, x_new, z_new);
        log_result("rearrange_box", &outcome);
        outcome
    }

    fn try_rearrange(&mut self, x: u8, z_level: u8, x_new: u8, z_new: u8) -> MoveOutcome {
        let from = self.validate(x, z_level)?;
        let to = self.validate(x_new, z_new)?;
        self.ensure_no_transit()?;
        if !self.inventory.is_occupied(from) {
            return self.carriage.fail(Fault::ShelfEmpty);
        }
        if self.inventory.is_occupied(to) {
            return self.carriage.fail(Fault::ShelfOccupied);
        }

        self.carriage.retrieve_from_shelf(from.x, from.z_level)?;
        self.inventory.begin_transit(from, Utc::now());
        self.persist()?;

        self.carriage.store_to_shelf(to.x, to.z_level)?;
        self.inventory.complete_transit(to, Utc::now());
        self.persist()
    }

    /// Store a box at a random free slot.
    pub fn store_box_random(&mut self) -> MoveOutcome {
        self.ensure_no_transit()?;
        if self.inventory.is_full() {
            return self.carriage.fail(Fault::StorageFull);
        }
        let slot = self.pick(self.inventory.free_slots())?;
        info!(%slot, "Random free slot chosen");
        self.store_box(slot.x, slot.z_level)
    }

    /// Take the box of a random occupied slot to the output dock.
    pub fn destore_box_random(&mut self) -> MoveOutcome {
        self.ensure_no_transit()?;
        if self.inventory.is_empty() {
            return self.carriage.fail(Fault::StorageEmpty);
        }
        let slot = self.pick(self.inventory.occupied_slots())?;
        info!(%slot, "Random occupied slot chosen");
        self.destore_box(slot.x, slot.z_level)
    }

    /// Drop the box left on the fork by an interrupted rearrange at the
    /// output dock and clear the in-transit marker.
    pub fn release_in_transit(&mut self) -> MoveOutcome {
        let Some(transit) = self.inventory.in_transit().copied() else {
            info!("release_in_transit: nothing in transit");
            return Ok(());
        };
        info!(from = %transit.from_slot, since = %transit.since, "Releasing box in transit");
        self.carriage.drop_to_output()?;
        self.inventory.release_transit();
        self.persist()
    }

    /// `occupancy:` summary of the grid.
    pub fn show_occupancy(&self) -> String {
        self.inventory.occupancy_string()
    }

    // ─── Helpers ────────────────────────────────────────────────────

    fn validate(&mut self, x: u8, z_level: u8) -> Result<SlotCoordinate, Fault> {
        self.carriage.slot_target(x, z_level, Fault::WrongTarget(Axis::Z))
    }

    fn ensure_no_transit(&mut self) -> MoveOutcome {
        match self.inventory.in_transit() {
            Some(transit) => {
                let from = transit.from_slot.get();
                self.carriage.fail(Fault::BoxInTransit(from))
            }
            None => Ok(()),
        }
    }

    /// Uniform choice among `candidates`.
    fn pick(&self, candidates: Vec<SlotCoordinate>) -> Result<SlotCoordinate, Fault> {
        candidates
            .choose(&mut rand::thread_rng())
            .copied()
            .ok_or_else(|| Fault::Internal("no eligible slot".into()))
    }

    fn persist(&mut self) -> MoveOutcome {
        match self.store.save(&self.inventory) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(path = %self.store.path().display(), "Inventory not saved");
                self.carriage.fail(err.into())
            }
        }
    }
}

fn log_result(operation: &str, outcome: &MoveOutcome) {
    info!(operation, result = outcome_code(outcome), "Operation finished");
}
