//! Emergency stop.
//!
//! Every wait loop samples the emergency-stop input once per tick, before
//! anything else. When it is asserted the loop calls
//! [`Carriage::emergency_stop`], which halts all motion outputs, forces
//! `SystemStatus::Error` and returns `Fault::EmergencyStop`.

use hbs_common::fault::{Fault, MoveOutcome};
use hbs_common::io::DigitalIo;
use hbs_common::time::Clock;
use tracing::error;

use crate::motion::Carriage;

impl<I: DigitalIo, C: Clock> Carriage<I, C> {
    /// Halt the rack: de-energize every motion output, status ERROR.
    pub fn emergency_stop(&mut self) -> MoveOutcome {
        self.stop_motion();
        error!("Emergency stop, system halted");
        self.fail(Fault::EmergencyStop)
    }

    /// Whether the emergency-stop button is pressed.
    pub fn emergency_stop_pressed(&mut self) -> bool {
        self.sample().emergency_stop()
    }
}
