//! # HBS HAL Library
//!
//! Backplane implementations behind [`hbs_common::io::DigitalIo`].
//!
//! The physical I/O board is an external collaborator; this crate ships the
//! rack simulator used by the test-suite and by `hbs --simulate`, and the
//! registry through which the binary selects a backplane by name.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`simulation`] - Rack physics, conveyors and virtual clock
//! - [`error`] - HAL error type

#![deny(missing_docs)]

pub mod driver_registry;
pub mod error;
pub mod simulation;

pub use crate::driver_registry::{Backplane, DriverFactory, DriverRegistry, SIMULATION_DRIVER};
pub use crate::error::HalError;
pub use crate::simulation::{RackSimulator, TimeBase, VirtualClock};
