//! Prelude module for common re-exports.
//!
//! ```rust
//! use hbs_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, HbsConfig, LogLevel, SharedConfig};

// ─── Rack geometry ──────────────────────────────────────────────────
pub use crate::consts::{SLOT_COUNT, X_COLUMNS, Z_LEVELS, Z_POSITIONS};

// ─── Types & results ────────────────────────────────────────────────
pub use crate::fault::{Fault, MoveOutcome, outcome_code};
pub use crate::types::{Axis, SlotCoordinate, SlotNumber, SystemStatus, YPosition};

// ─── I/O & time ─────────────────────────────────────────────────────
pub use crate::io::{DigitalIo, Outputs, Sensor, SensorFrame};
pub use crate::time::{Clock, Deadline, SystemClock};
