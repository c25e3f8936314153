//! Digital I/O boundary.
//!
//! - [`port`] - `DigitalIo` trait implemented by every backplane driver
//! - [`wiring`] - Fixed table mapping sensors and actuators to port pins

pub mod port;
pub mod wiring;

pub use port::DigitalIo;
pub use wiring::{Outputs, SensorFrame, Sensor};
