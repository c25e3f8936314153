//! Digital I/O port trait.
//!
//! The backplane exposes input ports as 8-bit vectors and output pins as
//! individually settable bits. Bits are *logical*: `1` means the sensor is
//! asserted or the actuator energized, whatever the electrical polarity of
//! the board.

use super::wiring::Outputs;

/// Register-level access to the rack I/O backplane.
///
/// Implementors: the rack simulator in `hbs_hal`, or a physical board driver.
/// Access is not locked; callers serialize operations themselves.
pub trait DigitalIo: Send {
    /// Read one input port as a bit vector (bit `n` = pin `n`).
    fn read_port(&mut self, port: u8) -> u8;

    /// Set one output pin.
    fn set_port(&mut self, port: u8, pin: u8, value: bool);

    /// Set every pin named in `outputs` to `value`.
    fn set_outputs(&mut self, outputs: Outputs, value: bool) {
        for (port, pin) in outputs.addresses() {
            self.set_port(port, pin, value);
        }
    }
}

impl<T: DigitalIo + ?Sized> DigitalIo for Box<T> {
    fn read_port(&mut self, port: u8) -> u8 {
        (**self).read_port(port)
    }

    fn set_port(&mut self, port: u8, pin: u8, value: bool) {
        (**self).set_port(port, pin, value)
    }
}
