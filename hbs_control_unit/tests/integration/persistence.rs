//! Integration test: inventory snapshots on disk.

use chrono::{DateTime, Utc};
use hbs_common::types::SlotNumber;
use hbs_control_unit::storage::{LoadOrigin, SnapshotStore, StorageInventory};
use proptest::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

fn build(occupied: &[Option<i64>], transit: Option<(u8, i64)>) -> StorageInventory {
    let mut inv = StorageInventory::new();
    for (n, stamp) in SlotNumber::all().zip(occupied) {
        if let Some(secs) = stamp {
            inv.occupy(n.coordinate(), at(*secs));
        }
    }
    if let Some((from, secs)) = transit {
        let from = SlotNumber::new(from).unwrap().coordinate();
        inv.begin_transit(from, at(secs));
    }
    inv
}

proptest! {
    #[test]
    fn snapshot_survives_reload(
        occupied in prop::collection::vec(prop::option::of(0i64..4_000_000_000), 50),
        transit in prop::option::of((1u8..=50, 0i64..4_000_000_000)),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("storage_places.bin"));
        let inv = build(&occupied, transit);
        store.save(&inv).unwrap();
        prop_assert_eq!(store.load().unwrap(), inv);
    }
}

#[test]
fn first_start_creates_free_grid() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("obj/storage_places.bin"));

    let (inv, origin) = store.load_or_create().unwrap();
    assert_eq!(origin, LoadOrigin::Created);
    assert_eq!(origin.code(), "storage_created");
    assert!(inv.is_empty());
    assert!(store.path().exists());

    let (_, origin) = store.load_or_create().unwrap();
    assert_eq!(origin, LoadOrigin::Loaded);
}

#[test]
fn garbage_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage_places.bin");
    std::fs::write(&path, b"not a snapshot").unwrap();
    assert!(SnapshotStore::new(&path).load().is_err());
}
