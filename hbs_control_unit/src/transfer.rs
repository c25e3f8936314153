//! Box transfer choreographies.
//!
//! Each transfer is a strict chain of moves: the first failing step aborts
//! the chain and its fault is returned unchanged. There is no rollback; the
//! carriage stays wherever it stopped.
//!
//! Shelf level `L` is served from two Z sub-positions: `2L` (fork above the
//! shelf floor) and `2L - 1` (fork below it). Lowering through the floor
//! with Y inserted sets a box down, raising through it picks one up.

use hbs_common::consts::{INPUT_DOCK_X, INPUT_DOCK_Z, OUTPUT_DOCK_X, OUTPUT_DOCK_Z};
use hbs_common::fault::{Fault, MoveOutcome};
use hbs_common::io::{DigitalIo, Outputs};
use hbs_common::time::{Clock, Deadline};
use hbs_common::types::{
    Axis, SlotCoordinate, SystemStatus, YPosition, is_valid_x, is_valid_z_level,
};
use tracing::{debug, info};

use crate::motion::Carriage;

impl<I: DigitalIo, C: Clock> Carriage<I, C> {
    /// Carry the box on the fork into the shelf at `x`/`z_level`.
    pub fn store_to_shelf(&mut self, x: u8, z_level: u8) -> MoveOutcome {
        let slot = self.slot_target(x, z_level, Fault::WrongZLevel)?;
        info!(%slot, "Storing box to shelf");
        self.move_y(YPosition::Default)?;
        self.move_xz(slot.x, slot.approach_z())?;
        self.move_y(YPosition::Insert)?;
        self.move_z(slot.deposit_z())?;
        self.move_y(YPosition::Default)
    }

    /// Lift the box out of the shelf at `x`/`z_level` onto the fork.
    pub fn retrieve_from_shelf(&mut self, x: u8, z_level: u8) -> MoveOutcome {
        let slot = self.slot_target(x, z_level, Fault::WrongZLevel)?;
        info!(%slot, "Retrieving box from shelf");
        self.move_y(YPosition::Default)?;
        self.move_xz(slot.x, slot.deposit_z())?;
        self.move_y(YPosition::Insert)?;
        self.move_z(slot.approach_z())?;
        self.move_y(YPosition::Default)
    }

    /// Pull a box in over the input conveyor and pick it up.
    pub fn fetch_from_input(&mut self) -> MoveOutcome {
        info!("Fetching box from input dock");
        self.move_y(YPosition::Default)?;
        self.move_xz(INPUT_DOCK_X, INPUT_DOCK_Z)?;
        self.run_input_belt()?;
        self.move_y(YPosition::Retract)?;
        self.move_z(INPUT_DOCK_Z + 1)?;
        self.move_y(YPosition::Default)
    }

    /// Set the box on the fork down at the output dock and convey it away.
    pub fn drop_to_output(&mut self) -> MoveOutcome {
        info!("Dropping box to output dock");
        self.move_y(YPosition::Default)?;
        self.move_xz(OUTPUT_DOCK_X, OUTPUT_DOCK_Z)?;
        self.move_y(YPosition::Retract)?;
        self.move_z(OUTPUT_DOCK_Z - 1)?;
        self.move_y(YPosition::Default)?;
        self.run_output_belt()
    }

    /// Validated shelf coordinate; a bad level fails with `z_fault`.
    pub(crate) fn slot_target(
        &mut self,
        x: u8,
        z_level: u8,
        z_fault: Fault,
    ) -> Result<SlotCoordinate, Fault> {
        if !is_valid_x(x) {
            self.fail(Fault::WrongTarget(Axis::X))?;
        }
        if !is_valid_z_level(z_level) {
            self.fail(z_fault)?;
        }
        SlotCoordinate::new(x, z_level)
            .ok_or_else(|| Fault::Internal(format!("coordinate {x}/{z_level}")))
    }

    /// Run the intake belts until the light barrier sees a box.
    fn run_input_belt(&mut self) -> MoveOutcome {
        self.set_status(SystemStatus::Busy);
        self.io.set_outputs(Outputs::INPUT_CONVEYOR, true);
        let deadline = Deadline::after(self.now(), self.conveyor.input_timeout());

        loop {
            let frame = self.sample();
            if frame.emergency_stop() {
                return self.emergency_stop();
            }
            if frame.box_at_input() {
                debug!("Light barrier interrupted");
                let debounce = self.conveyor.input_debounce();
                self.pause(debounce);
                break;
            }
            if deadline.expired(self.now()) {
                break;
            }
            self.tick();
        }

        self.io.set_outputs(Outputs::INPUT_CONVEYOR, false);
        self.settle();

        if self.sample().box_at_input() {
            self.succeed()
        } else {
            self.fail(Fault::InputBeltError)
        }
    }

    /// Run the output belts for the fixed release window.
    fn run_output_belt(&mut self) -> MoveOutcome {
        self.set_status(SystemStatus::Busy);
        self.io.set_outputs(Outputs::OUTPUT_CONVEYOR, true);
        let deadline = Deadline::after(self.now(), self.conveyor.output_run());

        loop {
            if self.sample().emergency_stop() {
                return self.emergency_stop();
            }
            if deadline.expired(self.now()) {
                break;
            }
            self.tick();
        }

        self.io.set_outputs(Outputs::OUTPUT_CONVEYOR, false);
        self.settle();
        self.succeed()
    }
}
