//! Test rig: carriage and orchestrator over a simulated rack.

use std::time::Duration;

use hbs_common::config::{ConveyorConfig, MotionConfig, SimulationConfig};
use hbs_common::time::Clock;
use hbs_common::types::SlotCoordinate;
use hbs_control_unit::storage::{SnapshotStore, StorageInventory};
use hbs_control_unit::{Carriage, StorageOrchestrator};
use hbs_hal::{RackSimulator, VirtualClock};
use tempfile::TempDir;

pub type SimCarriage = Carriage<RackSimulator, VirtualClock>;
pub type SimOrchestrator = StorageOrchestrator<RackSimulator, VirtualClock>;

/// Home position: X 10, Y DEFAULT, Z 1.
pub const HOME: [f64; 3] = [10.0, 1.0, 1.0];

/// Carriage at `start` (X, Y rank, Z) and a handle on its clock.
pub fn carriage(start: [f64; 3]) -> (SimCarriage, VirtualClock) {
    let motion = MotionConfig::default();
    let clock = VirtualClock::new(motion.tick());
    let sim = RackSimulator::with_virtual_clock(
        &SimulationConfig {
            start,
            ..SimulationConfig::default()
        },
        &clock,
    );
    let carriage = Carriage::new(sim, clock.clone(), motion, ConveyorConfig::default());
    (carriage, clock)
}

/// Orchestrator at home over `inventory`, persisting into a fresh directory.
pub fn orchestrator(inventory: StorageInventory) -> (SimOrchestrator, VirtualClock, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("obj/storage_places.bin"));
    store.save(&inventory).unwrap();
    let (mut carriage, clock) = carriage(HOME);
    for (n, slot) in inventory.iter() {
        carriage.io_mut().set_shelf(n.coordinate(), slot.occupied);
    }
    (StorageOrchestrator::new(carriage, inventory, store), clock, dir)
}

pub fn coord(x: u8, z_level: u8) -> SlotCoordinate {
    SlotCoordinate::new(x, z_level).unwrap()
}

/// Elapsed virtual time since `start`.
pub fn elapsed(clock: &VirtualClock, start: Duration) -> Duration {
    clock.now() - start
}
