//! Axis initialization (homing).
//!
//! Used once per axis at startup, when the carriage may rest between two
//! sensors. A defined axis needs no motion. Otherwise the axis sweeps one
//! way for half its stall window, then the other way for the full window,
//! stopping as soon as any sensor asserts.
//!
//! | Axis | First sweep      | Second sweep    | Extra          |
//! |------|------------------|-----------------|----------------|
//! | X    | down (slow)      | up (slow)       |                |
//! | Y    | retract          | insert          | ends at DEFAULT|
//! | Z    | down             | up              |                |

use std::time::Duration;

use hbs_common::fault::{Fault, MoveOutcome};
use hbs_common::io::{DigitalIo, Outputs};
use hbs_common::time::{Clock, Deadline};
use hbs_common::types::{SystemStatus, YPosition};
use tracing::{debug, info};

use super::Carriage;
use super::axis::{AxisKind, XAxis, YAxis, ZAxis};

/// Result of one homing sweep.
enum Sweep {
    /// A sensor asserted or the window ran out.
    Done,
    /// Emergency stop.
    Aborted(MoveOutcome),
}

impl<I: DigitalIo, C: Clock> Carriage<I, C> {
    /// Initialize X.
    pub fn init_x(&mut self) -> MoveOutcome {
        self.init_axis::<XAxis>()
    }

    /// Initialize Y and finish at DEFAULT.
    pub fn init_y(&mut self) -> MoveOutcome {
        self.init_axis::<YAxis>()?;
        self.move_y(YPosition::Default)
    }

    /// Initialize Z.
    pub fn init_z(&mut self) -> MoveOutcome {
        self.init_axis::<ZAxis>()
    }

    fn init_axis<A: AxisKind>(&mut self) -> MoveOutcome {
        info!(axis = %A::AXIS, "Initializing");
        let window = A::timeout(&self.motion);
        let sweeps = [
            (A::NEGATIVE | A::SLOW, window / 2),
            (A::POSITIVE | A::SLOW, window),
        ];

        for (outputs, window) in sweeps {
            if A::sense(&self.sample()).is_some() {
                break;
            }
            if let Sweep::Aborted(outcome) = self.sweep::<A>(outputs, window) {
                return outcome;
            }
        }

        match A::sense(&self.sample()) {
            Some(position) => {
                info!(axis = %A::AXIS, %position, "Initialized");
                self.succeed()
            }
            None => self.fail(Fault::InitializationError(A::AXIS)),
        }
    }

    fn sweep<A: AxisKind>(&mut self, outputs: Outputs, window: Duration) -> Sweep {
        debug!(axis = %A::AXIS, ?outputs, ?window, "Homing sweep");
        self.set_status(SystemStatus::Busy);
        self.io.set_outputs(outputs, true);
        let deadline = Deadline::after(self.now(), window);

        loop {
            let frame = self.sample();
            if frame.emergency_stop() {
                return Sweep::Aborted(self.emergency_stop());
            }
            if A::sense(&frame).is_some() || deadline.expired(self.now()) {
                break;
            }
            self.tick();
        }

        self.io.set_outputs(outputs, false);
        self.set_status(SystemStatus::Ready);
        self.settle();
        Sweep::Done
    }
}
