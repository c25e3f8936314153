//! Single-axis moves.
//!
//! One generic engine serves the linear axes (X, Z) and the discrete axis
//! (Y). Order of checks before any actuation:
//!
//! 1. Target inside the axis range, else `WrongTarget`
//! 2. X only: Y at DEFAULT when X is to change, else `YNotDefault`
//! 3. Already at target: success, nothing written
//! 4. Current position defined, else `UndefinedPosition`

use hbs_common::fault::{Fault, MoveOutcome};
use hbs_common::io::DigitalIo;
use hbs_common::time::Clock;
use hbs_common::types::{Axis, SystemStatus, YPosition};
use tracing::{debug, info};

use super::Carriage;
use super::axis::{AxisKind, AxisTrack, Progress, XAxis, YAxis, ZAxis};

impl<I: DigitalIo, C: Clock> Carriage<I, C> {
    /// Move X to column `target` (`1..=10`).
    pub fn move_x(&mut self, target: u8) -> MoveOutcome {
        self.move_axis::<XAxis>(target)
    }

    /// Move Y to `target`.
    pub fn move_y(&mut self, target: YPosition) -> MoveOutcome {
        self.move_axis::<YAxis>(target)
    }

    /// Move Y to the position of ordinal `rank`; anything but 0, 1, 2 is
    /// rejected as `WrongTarget`.
    pub fn move_y_rank(&mut self, rank: i16) -> MoveOutcome {
        match YPosition::from_rank(rank) {
            Some(target) => self.move_y(target),
            None => self.fail(Fault::WrongTarget(Axis::Y)),
        }
    }

    /// Move Z to sub-position `target` (`1..=10`).
    pub fn move_z(&mut self, target: u8) -> MoveOutcome {
        self.move_axis::<ZAxis>(target)
    }

    /// Drive axis `A` to `target`.
    pub fn move_axis<A: AxisKind>(&mut self, target: A::Position) -> MoveOutcome {
        if !A::is_valid(target) {
            return self.fail(Fault::WrongTarget(A::AXIS));
        }

        let frame = self.sample();
        let current = A::sense(&frame);
        if A::INTERLOCKED && current != Some(target) && frame.y() != Some(YPosition::Default) {
            return self.fail(Fault::YNotDefault);
        }
        if current == Some(target) {
            debug!(axis = %A::AXIS, position = %target, "Already at target");
            return self.succeed();
        }
        let Some(current) = current else {
            return self.fail(Fault::UndefinedPosition(A::AXIS));
        };

        info!(axis = %A::AXIS, from = %current, to = %target, "Axis move");
        self.set_status(SystemStatus::Busy);
        let now = self.now();
        let mut track = AxisTrack::<A>::start(&mut self.io, current, target, now, &self.motion);

        loop {
            let frame = self.sample();
            if frame.emergency_stop() {
                return self.emergency_stop();
            }
            let now = self.now();
            match track.observe(&mut self.io, &frame, now) {
                Progress::Arrived | Progress::Stalled => break,
                Progress::Moving => self.tick(),
            }
        }

        track.release(&mut self.io);
        self.set_status(SystemStatus::Ready);
        self.settle();

        if A::sense(&self.sample()) == Some(target) {
            self.succeed()
        } else {
            self.fail(Fault::PositionError(A::AXIS))
        }
    }
}
