//! Simultaneous X+Z move.
//!
//! Both axes run in one poll loop with independent tracking records. The
//! emergency stop is sampled once per tick for both; either axis stalling
//! ends the whole move. On exit X is verified before Z.

use hbs_common::fault::{Fault, MoveOutcome};
use hbs_common::io::DigitalIo;
use hbs_common::time::Clock;
use hbs_common::types::{Axis, SystemStatus, YPosition};
use tracing::{debug, info};

use super::Carriage;
use super::axis::{AxisKind, AxisTrack, Progress, XAxis, ZAxis};

impl<I: DigitalIo, C: Clock> Carriage<I, C> {
    /// Move X to `target_x` and Z to `target_z` at the same time.
    pub fn move_xz(&mut self, target_x: u8, target_z: u8) -> MoveOutcome {
        if !XAxis::is_valid(target_x) {
            return self.fail(Fault::WrongTarget(Axis::X));
        }
        if !ZAxis::is_valid(target_z) {
            return self.fail(Fault::WrongTarget(Axis::Z));
        }

        let frame = self.sample();
        let Some(current_x) = frame.x() else {
            return self.fail(Fault::UndefinedPosition(Axis::X));
        };
        let Some(current_z) = frame.z() else {
            return self.fail(Fault::UndefinedPosition(Axis::Z));
        };
        if current_x != target_x && frame.y() != Some(YPosition::Default) {
            return self.fail(Fault::YNotDefault);
        }
        if current_x == target_x && current_z == target_z {
            debug!(x = target_x, z = target_z, "Already at X/Z target");
            return self.succeed();
        }

        info!(
            from_x = current_x,
            from_z = current_z,
            to_x = target_x,
            to_z = target_z,
            "Coordinated X/Z move"
        );
        self.set_status(SystemStatus::Busy);
        let now = self.now();
        let mut x = AxisTrack::<XAxis>::start(&mut self.io, current_x, target_x, now, &self.motion);
        let mut z = AxisTrack::<ZAxis>::start(&mut self.io, current_z, target_z, now, &self.motion);

        loop {
            let frame = self.sample();
            if frame.emergency_stop() {
                return self.emergency_stop();
            }
            let now = self.now();
            let px = x.observe(&mut self.io, &frame, now);
            let pz = z.observe(&mut self.io, &frame, now);
            match (px, pz) {
                (Progress::Arrived, Progress::Arrived) => break,
                (Progress::Stalled, _) | (_, Progress::Stalled) => {
                    debug!(?px, ?pz, "Coordinated move stalled");
                    break;
                }
                _ => self.tick(),
            }
        }

        x.release(&mut self.io);
        z.release(&mut self.io);
        self.set_status(SystemStatus::Ready);
        self.settle();

        let frame = self.sample();
        if frame.x() != Some(target_x) {
            return self.fail(Fault::PositionError(Axis::X));
        }
        if frame.z() != Some(target_z) {
            return self.fail(Fault::PositionError(Axis::Z));
        }
        self.succeed()
    }
}
