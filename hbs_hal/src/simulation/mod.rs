//! Rack simulator.
//!
//! - [`clock`] - Shared virtual clock for deterministic tests
//! - [`axis`] - Per-axis motion and sensor ladder model
//! - [`rack`] - `RackSimulator`, the simulated backplane

pub mod axis;
pub mod clock;
pub mod rack;

pub use clock::VirtualClock;
pub use rack::{RackSimulator, TimeBase};
