//! Core data types shared by the control unit, the HAL and the binary.
//!
//! - `Axis` - Axis discriminator (X, Y, Z)
//! - `SlotNumber` / `SlotCoordinate` - Bijective slot addressing
//! - `YPosition` - Three-valued depth of the Y axis
//! - `SystemStatus` - Operating mode shown on the console

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::consts::{SLOT_COUNT, X_COLUMNS, Z_LEVELS};

// ─── Axis ───────────────────────────────────────────────────────────

/// Axis discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal travel along the shelf columns.
    X,
    /// Depth: retract / default / insert.
    Y,
    /// Vertical travel over the shelf sub-positions.
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
        }
    }
}

// ─── Slot addressing ────────────────────────────────────────────────

/// Slot number in `1..=50`.
///
/// `slot_number = (z_level - 1) * 10 + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotNumber(u8);

impl SlotNumber {
    /// Create a slot number, `None` when outside `1..=50`.
    pub const fn new(n: u8) -> Option<Self> {
        if n >= 1 && n <= SLOT_COUNT {
            Some(Self(n))
        } else {
            None
        }
    }

    /// Raw value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterate all 50 slot numbers in ascending order.
    pub fn all() -> impl Iterator<Item = SlotNumber> {
        (1..=SLOT_COUNT).map(SlotNumber)
    }

    /// Coordinates of this slot.
    pub const fn coordinate(self) -> SlotCoordinate {
        let idx = self.0 - 1;
        SlotCoordinate {
            x: idx % X_COLUMNS + 1,
            z_level: idx / X_COLUMNS + 1,
        }
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shelf slot coordinate: column `x` in `1..=10`, shelf level `z_level` in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotCoordinate {
    /// Shelf column.
    pub x: u8,
    /// Logical shelf level.
    pub z_level: u8,
}

impl SlotCoordinate {
    /// Create a coordinate, `None` when either component is out of range.
    pub const fn new(x: u8, z_level: u8) -> Option<Self> {
        if is_valid_x(x) && is_valid_z_level(z_level) {
            Some(Self { x, z_level })
        } else {
            None
        }
    }

    /// Slot number of this coordinate.
    pub const fn slot_number(self) -> SlotNumber {
        SlotNumber((self.z_level - 1) * X_COLUMNS + self.x)
    }

    /// Z sub-position in front of the shelf (carriage clear of the shelf floor).
    pub const fn approach_z(self) -> u8 {
        self.z_level * 2
    }

    /// Z sub-position below the shelf floor (box resting on the shelf).
    pub const fn deposit_z(self) -> u8 {
        self.z_level * 2 - 1
    }
}

impl fmt::Display for SlotCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.z_level)
    }
}

/// Column in range `1..=10`.
#[inline]
pub const fn is_valid_x(x: u8) -> bool {
    x >= 1 && x <= X_COLUMNS
}

/// Shelf level in range `1..=5`.
#[inline]
pub const fn is_valid_z_level(z_level: u8) -> bool {
    z_level >= 1 && z_level <= Z_LEVELS
}

// ─── Y position ─────────────────────────────────────────────────────

/// Depth of the Y axis. An undefined reading is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum YPosition {
    /// Fully retracted, used at the conveyor docks.
    Retract = 0,
    /// Centered; the only depth at which X may move.
    Default = 1,
    /// Extended into the shelf.
    Insert = 2,
}

impl YPosition {
    /// All positions in rank order.
    pub const ALL: [YPosition; 3] = [Self::Retract, Self::Default, Self::Insert];

    /// Ordinal rank.
    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Position from rank, `None` for anything but 0, 1, 2.
    pub const fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            0 => Some(Self::Retract),
            1 => Some(Self::Default),
            2 => Some(Self::Insert),
            _ => None,
        }
    }
}

impl fmt::Display for YPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retract => write!(f, "RETRACT"),
            Self::Default => write!(f, "DEFAULT"),
            Self::Insert => write!(f, "INSERT"),
        }
    }
}

// ─── System status ──────────────────────────────────────────────────

/// Operating mode of the rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemStatus {
    /// Idle, ready for the next command.
    #[default]
    Ready,
    /// Actuators energized or a command is running.
    Busy,
    /// Last operation failed; cleared by a successful move or re-initialization.
    Error,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "READY"),
            Self::Busy => write!(f, "BUSY"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}
