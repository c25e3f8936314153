//! Axis kinds and the per-axis tracking state of a move.
//!
//! X and Z are linear axes over a ladder of ten position sensors; Y is a
//! discrete axis over three. Both kinds share one tracking record
//! ([`AxisTrack`]) parameterized by [`AxisKind`]: sensing, validity check,
//! directional outputs, slow zone and stall window.

use core::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use hbs_common::config::MotionConfig;
use hbs_common::consts::Z_POSITIONS;
use hbs_common::io::{DigitalIo, Outputs, SensorFrame};
use hbs_common::time::Deadline;
use hbs_common::types::{Axis, YPosition, is_valid_x};
use tracing::trace;

// ─── Axis kinds ─────────────────────────────────────────────────────

/// Compile-time description of one carriage axis.
pub trait AxisKind {
    /// Sensed position type.
    type Position: Copy + PartialEq + fmt::Debug + fmt::Display;

    /// Axis discriminator used in faults and logs.
    const AXIS: Axis;
    /// Output driving towards higher rank.
    const POSITIVE: Outputs;
    /// Output driving towards lower rank.
    const NEGATIVE: Outputs;
    /// Deceleration output, empty when the axis has none.
    const SLOW: Outputs = Outputs::empty();
    /// Whether moving this axis requires Y at DEFAULT.
    const INTERLOCKED: bool = false;

    /// Whether `target` lies inside the axis range.
    fn is_valid(target: Self::Position) -> bool;

    /// Position read from a sensor frame, `None` when undefined.
    fn sense(frame: &SensorFrame) -> Option<Self::Position>;

    /// Ordinal rank used to pick the direction.
    fn rank(position: Self::Position) -> i16;

    /// Stall window.
    fn timeout(config: &MotionConfig) -> Duration;
}

/// Horizontal axis, columns `1..=10`.
#[derive(Debug, Clone, Copy)]
pub struct XAxis;

/// Depth axis, RETRACT / DEFAULT / INSERT.
#[derive(Debug, Clone, Copy)]
pub struct YAxis;

/// Vertical axis, sub-positions `1..=10`.
#[derive(Debug, Clone, Copy)]
pub struct ZAxis;

impl AxisKind for XAxis {
    type Position = u8;
    const AXIS: Axis = Axis::X;
    const POSITIVE: Outputs = Outputs::X_UP;
    const NEGATIVE: Outputs = Outputs::X_DOWN;
    const SLOW: Outputs = Outputs::X_SLOW;
    const INTERLOCKED: bool = true;

    fn is_valid(target: u8) -> bool {
        is_valid_x(target)
    }

    fn sense(frame: &SensorFrame) -> Option<u8> {
        frame.x()
    }

    fn rank(position: u8) -> i16 {
        position as i16
    }

    fn timeout(config: &MotionConfig) -> Duration {
        config.x_timeout()
    }
}

impl AxisKind for YAxis {
    type Position = YPosition;
    const AXIS: Axis = Axis::Y;
    const POSITIVE: Outputs = Outputs::Y_INSERT;
    const NEGATIVE: Outputs = Outputs::Y_RETRACT;

    fn is_valid(_target: YPosition) -> bool {
        true
    }

    fn sense(frame: &SensorFrame) -> Option<YPosition> {
        frame.y()
    }

    fn rank(position: YPosition) -> i16 {
        position.rank() as i16
    }

    fn timeout(config: &MotionConfig) -> Duration {
        config.y_timeout()
    }
}

impl AxisKind for ZAxis {
    type Position = u8;
    const AXIS: Axis = Axis::Z;
    const POSITIVE: Outputs = Outputs::Z_UP;
    const NEGATIVE: Outputs = Outputs::Z_DOWN;

    fn is_valid(target: u8) -> bool {
        (1..=Z_POSITIONS).contains(&target)
    }

    fn sense(frame: &SensorFrame) -> Option<u8> {
        frame.z()
    }

    fn rank(position: u8) -> i16 {
        position as i16
    }

    fn timeout(config: &MotionConfig) -> Duration {
        config.z_timeout()
    }
}

// ─── Tracking ───────────────────────────────────────────────────────

/// Result of one observation of a tracked axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Target sensed; the axis outputs are released.
    Arrived,
    /// Still travelling within the stall window.
    Moving,
    /// Stall window expired without reaching the target.
    Stalled,
}

/// State of one axis during a move.
///
/// Holds the arrived flag, the stall deadline and the energized outputs.
/// The deadline renews each time a sensor newly asserts, so it only expires
/// when the carriage stops crossing sensors.
#[derive(Debug)]
pub struct AxisTrack<A: AxisKind> {
    target: A::Position,
    /// Last sensed position, `None` while between sensors.
    last: Option<A::Position>,
    deadline: Deadline,
    energized: Outputs,
    arrived: bool,
    _axis: PhantomData<A>,
}

impl<A: AxisKind> AxisTrack<A> {
    /// Start tracking from a defined `current` position, energizing the
    /// direction output unless the axis is already at `target`.
    pub fn start<I: DigitalIo + ?Sized>(
        io: &mut I,
        current: A::Position,
        target: A::Position,
        now: Duration,
        config: &MotionConfig,
    ) -> Self {
        let mut track = Self {
            target,
            last: Some(current),
            deadline: Deadline::after(now, A::timeout(config)),
            energized: Outputs::empty(),
            arrived: current == target,
            _axis: PhantomData,
        };
        if !track.arrived {
            let drive = if A::rank(target) > A::rank(current) {
                A::POSITIVE
            } else {
                A::NEGATIVE
            };
            io.set_outputs(drive, true);
            track.energized = drive;
            track.update_slow(io, current);
        }
        track
    }

    /// Whether the target was sensed.
    #[inline]
    pub fn arrived(&self) -> bool {
        self.arrived
    }

    /// Target of this move.
    #[inline]
    pub fn target(&self) -> A::Position {
        self.target
    }

    /// Evaluate one sensor frame taken at `now`.
    pub fn observe<I: DigitalIo + ?Sized>(
        &mut self,
        io: &mut I,
        frame: &SensorFrame,
        now: Duration,
    ) -> Progress {
        if self.arrived {
            return Progress::Arrived;
        }

        let sensed = A::sense(frame);
        if sensed == Some(self.target) {
            self.arrived = true;
            self.release(io);
            trace!(axis = %A::AXIS, position = %self.target, "Target sensed");
            return Progress::Arrived;
        }

        if let Some(position) = sensed {
            if self.last != sensed {
                self.deadline.renew(now);
                trace!(axis = %A::AXIS, %position, "Sensor crossed, stall window renewed");
            }
            self.update_slow(io, position);
        }
        self.last = sensed;

        if self.deadline.expired(now) {
            Progress::Stalled
        } else {
            Progress::Moving
        }
    }

    /// De-energize every output this track switched on.
    pub fn release<I: DigitalIo + ?Sized>(&mut self, io: &mut I) {
        if !self.energized.is_empty() {
            io.set_outputs(self.energized, false);
            self.energized = Outputs::empty();
        }
    }

    /// Switch the slow output on inside one unit of the target.
    fn update_slow<I: DigitalIo + ?Sized>(&mut self, io: &mut I, position: A::Position) {
        if A::SLOW.is_empty() {
            return;
        }
        let near = (A::rank(self.target) - A::rank(position)).abs() <= 1;
        if near != self.energized.contains(A::SLOW) {
            io.set_outputs(A::SLOW, near);
            self.energized.set(A::SLOW, near);
        }
    }
}
