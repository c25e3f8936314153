//! Integration test: store, destore and rearrange over the simulated rack.

use chrono::Utc;
use hbs_common::fault::Fault;
use hbs_common::io::Sensor;
use hbs_common::types::{Axis, SlotNumber, SystemStatus};
use hbs_control_unit::storage::{SnapshotStore, StorageInventory};

use super::rig::{coord, orchestrator};

fn inventory_with(occupied: &[(u8, u8)]) -> StorageInventory {
    let mut inv = StorageInventory::new();
    for &(x, z_level) in occupied {
        inv.occupy(coord(x, z_level), Utc::now());
    }
    inv
}

fn reload(dir: &tempfile::TempDir) -> StorageInventory {
    SnapshotStore::new(dir.path().join("obj/storage_places.bin"))
        .load()
        .unwrap()
}

#[test]
fn store_box_fills_slot_and_persists() {
    let (mut o, _clock, dir) = orchestrator(StorageInventory::new());
    o.carriage_mut().io_mut().load_input_belt(1);

    let before = Utc::now();
    assert_eq!(o.store_box(3, 2), Ok(()));
    let slot = o.inventory().slot(SlotNumber::new(13).unwrap()).unwrap();
    assert!(slot.occupied);
    assert!(slot.stored_at.is_some_and(|at| at >= before));
    assert!(o.carriage_mut().io_mut().shelf_occupied(coord(3, 2)));
    assert_eq!(o.status(), SystemStatus::Ready);

    let on_disk = reload(&dir);
    assert_eq!(&on_disk, o.inventory());
}

#[test]
fn store_into_occupied_slot_is_refused_without_motion() {
    let (mut o, _clock, _dir) = orchestrator(inventory_with(&[(3, 2)]));
    assert_eq!(o.store_box(3, 2), Err(Fault::ShelfOccupied));
    assert_eq!(o.carriage().io().output_writes(), 0);
    // Inventory conflicts are refusals, not machine errors.
    assert_eq!(o.status(), SystemStatus::Ready);
}

#[test]
fn destore_from_free_slot_is_refused_without_motion() {
    let (mut o, _clock, _dir) = orchestrator(StorageInventory::new());
    assert_eq!(o.destore_box(5, 5), Err(Fault::ShelfEmpty));
    assert_eq!(o.carriage().io().output_writes(), 0);
}

#[test]
fn invalid_coordinates_are_rejected_first() {
    let (mut o, _clock, _dir) = orchestrator(StorageInventory::new());
    assert_eq!(o.store_box(11, 2), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(o.destore_box(4, 6), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(o.rearrange_box(1, 1, 0, 1), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(o.carriage().io().output_writes(), 0);
    assert_eq!(o.status(), SystemStatus::Error);
}

#[test]
fn bad_shelf_level_is_a_z_target_error() {
    let (mut o, _clock, _dir) = orchestrator(inventory_with(&[(1, 1)]));
    assert_eq!(o.store_box(3, 6), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(o.destore_box(3, 0), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(o.rearrange_box(1, 1, 2, 9), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(
        o.rearrange_box(1, 1, 2, 9).unwrap_err().code(),
        "err_wrong_z_target"
    );
    assert_eq!(o.carriage().io().output_writes(), 0);
    assert!(o.inventory().is_occupied(coord(1, 1)));
}

#[test]
fn store_then_destore_round_trip() {
    let (mut o, _clock, dir) = orchestrator(StorageInventory::new());
    o.carriage_mut().io_mut().load_input_belt(1);
    assert_eq!(o.store_box(6, 4), Ok(()));
    assert_eq!(o.destore_box(6, 4), Ok(()));

    assert!(o.inventory().is_empty());
    assert!(!o.carriage_mut().io_mut().shelf_occupied(coord(6, 4)));
    assert_eq!(o.carriage_mut().io_mut().delivered(), 1);
    assert!(reload(&dir).is_empty());
}

#[test]
fn failed_fetch_leaves_inventory_untouched() {
    let (mut o, _clock, dir) = orchestrator(StorageInventory::new());
    assert_eq!(o.store_box(2, 2), Err(Fault::InputBeltError));
    assert!(o.inventory().is_empty());
    assert!(reload(&dir).is_empty());
}

#[test]
fn random_operations_refuse_on_full_and_empty() {
    let all: Vec<(u8, u8)> = SlotNumber::all()
        .map(|n| (n.coordinate().x, n.coordinate().z_level))
        .collect();
    let (mut o, _clock, _dir) = orchestrator(inventory_with(&all));
    assert_eq!(o.store_box_random(), Err(Fault::StorageFull));
    assert_eq!(o.carriage().io().output_writes(), 0);

    let (mut o, _clock, _dir) = orchestrator(StorageInventory::new());
    assert_eq!(o.destore_box_random(), Err(Fault::StorageEmpty));
    assert_eq!(o.carriage().io().output_writes(), 0);
}

#[test]
fn random_store_picks_the_only_free_slot() {
    let all_but_one: Vec<(u8, u8)> = SlotNumber::all()
        .map(|n| (n.coordinate().x, n.coordinate().z_level))
        .filter(|&c| c != (9, 1))
        .collect();
    let (mut o, _clock, _dir) = orchestrator(inventory_with(&all_but_one));
    o.carriage_mut().io_mut().load_input_belt(1);
    assert_eq!(o.store_box_random(), Ok(()));
    assert!(o.inventory().is_full());
    assert!(o.carriage_mut().io_mut().shelf_occupied(coord(9, 1)));
}

#[test]
fn random_destore_picks_the_only_occupied_slot() {
    let (mut o, _clock, _dir) = orchestrator(inventory_with(&[(2, 1)]));
    assert_eq!(o.destore_box_random(), Ok(()));
    assert!(o.inventory().is_empty());
    assert_eq!(o.carriage_mut().io_mut().delivered(), 1);
}

#[test]
fn rearrange_moves_box_between_slots() {
    let (mut o, _clock, dir) = orchestrator(inventory_with(&[(2, 1), (8, 5)]));
    assert_eq!(o.rearrange_box(2, 1, 8, 5), Err(Fault::ShelfOccupied));
    assert_eq!(o.rearrange_box(3, 3, 4, 3), Err(Fault::ShelfEmpty));
    assert_eq!(o.carriage().io().output_writes(), 0);

    assert_eq!(o.rearrange_box(2, 1, 4, 3), Ok(()));
    assert!(!o.inventory().is_occupied(coord(2, 1)));
    assert!(o.inventory().is_occupied(coord(4, 3)));
    assert!(o.inventory().in_transit().is_none());
    assert!(o.carriage_mut().io_mut().shelf_occupied(coord(4, 3)));
    assert_eq!(&reload(&dir), o.inventory());
}

#[test]
fn interrupted_rearrange_blocks_until_released() {
    let (mut o, _clock, dir) = orchestrator(inventory_with(&[(2, 1)]));
    // Z overshoots the approach position of level 3 and hits the top stop.
    o.carriage_mut().io_mut().fail_sensor(Sensor::Z(6));
    assert_eq!(o.rearrange_box(2, 1, 4, 3), Err(Fault::PositionError(Axis::Z)));

    let on_disk = reload(&dir);
    assert_eq!(on_disk.in_transit().map(|t| t.from_slot.get()), Some(2));
    assert!(on_disk.is_empty());
    assert!(o.carriage_mut().io_mut().carriage_loaded());

    assert_eq!(o.store_box(5, 5), Err(Fault::BoxInTransit(2)));
    assert_eq!(o.destore_box_random(), Err(Fault::BoxInTransit(2)));

    o.carriage_mut().io_mut().heal_sensors();
    assert_eq!(o.init_z(), Ok(()));
    assert_eq!(o.release_in_transit(), Ok(()));
    assert_eq!(o.carriage_mut().io_mut().delivered(), 1);
    assert!(o.inventory().in_transit().is_none());
    assert!(reload(&dir).in_transit().is_none());

    // Nothing left to release.
    assert_eq!(o.release_in_transit(), Ok(()));
}

#[test]
fn show_occupancy_lists_every_slot() {
    let (o, _clock, _dir) = orchestrator(inventory_with(&[(1, 1), (10, 5)]));
    let summary = o.show_occupancy();
    assert!(summary.starts_with("occupancy:*"));
    assert!(summary.ends_with('*'));
    assert_eq!(summary.matches('*').count(), 2);
}
