//! Rack geometry and default paths.
//!
//! Single source of truth for the dimensions of the rack, imported by all
//! crates.

use static_assertions::const_assert_eq;

/// Number of shelf columns along X.
pub const X_COLUMNS: u8 = 10;

/// Number of physical Z sub-positions (two per shelf level).
pub const Z_POSITIONS: u8 = 10;

/// Number of logical shelf levels.
pub const Z_LEVELS: u8 = 5;

/// Total number of storage slots.
pub const SLOT_COUNT: u8 = 50;

const_assert_eq!(SLOT_COUNT, X_COLUMNS * Z_LEVELS);
const_assert_eq!(Z_POSITIONS, Z_LEVELS * 2);

/// Number of readable input ports on the backplane.
pub const INPUT_PORTS: u8 = 4;

/// Number of pins per port.
pub const PINS_PER_PORT: u8 = 8;

/// X column of the input conveyor dock.
pub const INPUT_DOCK_X: u8 = 10;

/// Z sub-position of the input conveyor dock.
pub const INPUT_DOCK_Z: u8 = 1;

/// X column of the output conveyor dock.
pub const OUTPUT_DOCK_X: u8 = 1;

/// Z sub-position of the output conveyor dock (approach height).
pub const OUTPUT_DOCK_Z: u8 = 2;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/hbs.toml";

/// Default inventory snapshot path.
pub const DEFAULT_SNAPSHOT_PATH: &str = "obj/storage_places.bin";

/// Default poll tick period in microseconds (1 kHz).
pub const TICK_US: u64 = 1000;
