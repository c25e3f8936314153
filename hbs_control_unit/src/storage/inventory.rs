//! Slot occupancy grid.
//!
//! Exactly 50 entries keyed by slot number, created once and mutated in
//! place. A slot carries a timestamp iff it is occupied.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hbs_common::consts::{SLOT_COUNT, X_COLUMNS, Z_LEVELS};
use hbs_common::types::{SlotCoordinate, SlotNumber};
use serde::{Deserialize, Serialize};

/// Prefix of the occupancy summary string.
pub const OCCUPANCY_PREFIX: &str = "occupancy:";

/// One storage place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageSlot {
    /// A box rests in the slot.
    pub occupied: bool,
    /// When the box was stored.
    pub stored_at: Option<DateTime<Utc>>,
}

impl StorageSlot {
    /// Free slot.
    pub const fn free() -> Self {
        Self {
            occupied: false,
            stored_at: None,
        }
    }

    /// Slot holding a box stored at `at`.
    pub const fn occupied_at(at: DateTime<Utc>) -> Self {
        Self {
            occupied: true,
            stored_at: Some(at),
        }
    }

    /// Whether `stored_at` is set exactly when the slot is occupied.
    pub const fn is_consistent(&self) -> bool {
        self.occupied == self.stored_at.is_some()
    }
}

/// Box lifted out of a slot and not yet stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InTransit {
    /// Slot the box came from.
    pub from_slot: SlotNumber,
    /// When it was lifted.
    pub since: DateTime<Utc>,
}

/// The 50-slot occupancy grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInventory {
    slots: BTreeMap<SlotNumber, StorageSlot>,
    in_transit: Option<InTransit>,
}

impl Default for StorageInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageInventory {
    /// 50 free slots.
    pub fn new() -> Self {
        Self {
            slots: SlotNumber::all().map(|n| (n, StorageSlot::free())).collect(),
            in_transit: None,
        }
    }

    /// Inventory from raw parts, as read from a snapshot.
    pub fn from_parts(
        slots: BTreeMap<SlotNumber, StorageSlot>,
        in_transit: Option<InTransit>,
    ) -> Self {
        Self { slots, in_transit }
    }

    /// Entry of `slot`.
    pub fn slot(&self, slot: SlotNumber) -> Option<&StorageSlot> {
        self.slots.get(&slot)
    }

    /// Iterate all entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotNumber, &StorageSlot)> {
        self.slots.iter().map(|(n, s)| (*n, s))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether a box rests at `coord`.
    pub fn is_occupied(&self, coord: SlotCoordinate) -> bool {
        self.slots
            .get(&coord.slot_number())
            .is_some_and(|s| s.occupied)
    }

    /// Mark `coord` occupied at `at`.
    pub fn occupy(&mut self, coord: SlotCoordinate, at: DateTime<Utc>) {
        self.slots
            .insert(coord.slot_number(), StorageSlot::occupied_at(at));
    }

    /// Mark `coord` free.
    pub fn clear(&mut self, coord: SlotCoordinate) {
        self.slots.insert(coord.slot_number(), StorageSlot::free());
    }

    // ─── Transit marker ─────────────────────────────────────────────

    /// Box currently recorded as carried between two slots.
    pub fn in_transit(&self) -> Option<&InTransit> {
        self.in_transit.as_ref()
    }

    /// Clear `from` and record its box as in transit.
    pub fn begin_transit(&mut self, from: SlotCoordinate, at: DateTime<Utc>) {
        self.clear(from);
        self.in_transit = Some(InTransit {
            from_slot: from.slot_number(),
            since: at,
        });
    }

    /// Store the box in transit at `to`.
    pub fn complete_transit(&mut self, to: SlotCoordinate, at: DateTime<Utc>) {
        self.occupy(to, at);
        self.in_transit = None;
    }

    /// Forget the box in transit (it left the rack).
    pub fn release_transit(&mut self) -> Option<InTransit> {
        self.in_transit.take()
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Coordinates of every free slot, in slot order.
    pub fn free_slots(&self) -> Vec<SlotCoordinate> {
        self.filter_slots(false)
    }

    /// Coordinates of every occupied slot, in slot order.
    pub fn occupied_slots(&self) -> Vec<SlotCoordinate> {
        self.filter_slots(true)
    }

    fn filter_slots(&self, occupied: bool) -> Vec<SlotCoordinate> {
        self.slots
            .iter()
            .filter(|(_, s)| s.occupied == occupied)
            .map(|(n, _)| n.coordinate())
            .collect()
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.values().filter(|s| s.occupied).count()
    }

    /// Every slot holds a box.
    pub fn is_full(&self) -> bool {
        self.slots.values().all(|s| s.occupied)
    }

    /// No slot holds a box.
    pub fn is_empty(&self) -> bool {
        !self.slots.values().any(|s| s.occupied)
    }

    /// `occupancy:` followed by one character per slot 1..50, `*` occupied,
    /// `_` free.
    pub fn occupancy_string(&self) -> String {
        let mut out = String::with_capacity(OCCUPANCY_PREFIX.len() + SLOT_COUNT as usize);
        out.push_str(OCCUPANCY_PREFIX);
        out.extend(SlotNumber::all().map(|n| {
            if self.slots.get(&n).is_some_and(|s| s.occupied) {
                '*'
            } else {
                '_'
            }
        }));
        out
    }

    /// Text grid, top shelf level first.
    pub fn render_grid(&self) -> String {
        let mut out = String::new();
        for level in (1..=Z_LEVELS).rev() {
            out.push_str(&format!("{level} |"));
            for x in 1..=X_COLUMNS {
                let mark = SlotCoordinate::new(x, level)
                    .is_some_and(|c| self.is_occupied(c));
                out.push_str(if mark { " #" } else { " ." });
            }
            out.push('\n');
        }
        out.push_str("   ");
        for x in 1..=X_COLUMNS {
            out.push_str(&format!(" {}", x % 10));
        }
        out.push('\n');
        out
    }
}
