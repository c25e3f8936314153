//! Carriage motion control.
//!
//! [`Carriage`] owns the backplane port and the poll clock and implements
//! every motion primitive of the rack:
//!
//! - [`axis`] - Axis kinds and the per-axis tracking record
//! - [`single`] - Single-axis moves (`move_x`, `move_y`, `move_z`)
//! - [`coordinated`] - Simultaneous X+Z move
//! - [`homing`] - Startup sweeps for undefined axes
//!
//! All poll loops follow the same tick contract: sample the emergency stop
//! first, then the positions, then check deadlines, then `Clock::tick()`.

pub mod axis;
pub mod coordinated;
pub mod homing;
pub mod single;

use hbs_common::config::{ConveyorConfig, MotionConfig};
use hbs_common::fault::{Fault, MoveOutcome};
use hbs_common::io::{DigitalIo, Outputs, SensorFrame};
use hbs_common::time::Clock;
use hbs_common::types::{SystemStatus, YPosition};
use tracing::{debug, error, info, warn};

/// X column of the home position.
pub const HOME_X: u8 = 10;
/// Z sub-position of the home position.
pub const HOME_Z: u8 = 1;

/// The rack carriage: backplane port, poll clock and operating status.
///
/// Exclusively owns the port; all motion is serialized through `&mut self`.
pub struct Carriage<I: DigitalIo, C: Clock> {
    pub(crate) io: I,
    clock: C,
    pub(crate) motion: MotionConfig,
    pub(crate) conveyor: ConveyorConfig,
    status: SystemStatus,
}

impl<I: DigitalIo, C: Clock> Carriage<I, C> {
    /// Create a carriage over `io`, polling at the pace of `clock`.
    pub fn new(io: I, clock: C, motion: MotionConfig, conveyor: ConveyorConfig) -> Self {
        Self {
            io,
            clock,
            motion,
            conveyor,
            status: SystemStatus::Ready,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Backplane port.
    pub fn io(&self) -> &I {
        &self.io
    }

    /// Mutable backplane port.
    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// Poll clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Motion timing.
    pub fn motion_config(&self) -> &MotionConfig {
        &self.motion
    }

    /// Conveyor timing.
    pub fn conveyor_config(&self) -> &ConveyorConfig {
        &self.conveyor
    }

    /// Current operating status.
    pub fn status(&self) -> SystemStatus {
        self.status
    }

    /// Force the operating status (console overrides, startup).
    pub fn set_status(&mut self, status: SystemStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "Status change");
            self.status = status;
        }
    }

    // ─── Position queries ───────────────────────────────────────────

    /// Sample every input port.
    pub fn sample(&mut self) -> SensorFrame {
        SensorFrame::read(&mut self.io)
    }

    /// Live X column, `None` when undefined.
    pub fn x(&mut self) -> Option<u8> {
        self.sample().x()
    }

    /// Live Y depth, `None` when undefined.
    pub fn y(&mut self) -> Option<YPosition> {
        self.sample().y()
    }

    /// Live Z sub-position, `None` when undefined.
    pub fn z(&mut self) -> Option<u8> {
        self.sample().z()
    }

    // ─── Composite motion ───────────────────────────────────────────

    /// Move to the home position: Y DEFAULT, then Z 1, then X 10.
    pub fn move_home(&mut self) -> MoveOutcome {
        info!("Moving home");
        self.move_y(YPosition::Default)?;
        self.move_z(HOME_Z)?;
        self.move_x(HOME_X)
    }

    /// De-energize every motion output: all axes and both conveyors.
    pub fn stop_motion(&mut self) {
        self.io.set_outputs(Outputs::ALL_MOTION, false);
    }

    // ─── Outcome bookkeeping ────────────────────────────────────────

    /// Record a successful operation: clears a sticky ERROR.
    pub(crate) fn succeed(&mut self) -> MoveOutcome {
        self.set_status(SystemStatus::Ready);
        Ok(())
    }

    /// Record a failed operation and return it.
    pub(crate) fn fail(&mut self, fault: Fault) -> MoveOutcome {
        if fault.forces_error_status() {
            error!(code = fault.code(), "{fault}");
            self.set_status(SystemStatus::Error);
        } else {
            warn!(code = fault.code(), "{fault}");
        }
        Err(fault)
    }

    /// Pause for the settle time after actuators were released.
    pub(crate) fn settle(&mut self) {
        let settle = self.motion.settle();
        self.clock.pause(settle);
    }

    /// Current poll time.
    pub(crate) fn now(&self) -> std::time::Duration {
        self.clock.now()
    }

    /// Wait one poll tick.
    pub(crate) fn tick(&mut self) {
        self.clock.tick();
    }

    /// Pause for `duration`.
    pub(crate) fn pause(&mut self, duration: std::time::Duration) {
        self.clock.pause(duration);
    }
}
