//! Simulated rack backplane.
//!
//! The `RackSimulator` implements [`DigitalIo`] on top of:
//! - Three [`AxisModel`]s driven by the energized motor outputs
//! - The shelf, carriage and dock box model (pick and place on Z crossings)
//! - The intake and output conveyors with the input-dock light barrier
//! - The emergency-stop button, with scheduled presses for tests
//! - Fault injection: silent sensors, jammed motors
//!
//! Physics is integrated lazily: every port access first advances the model
//! to the current time of its [`TimeBase`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use hbs_common::config::SimulationConfig;
use hbs_common::consts::{
    INPUT_DOCK_X, INPUT_PORTS, OUTPUT_DOCK_X, SLOT_COUNT, X_COLUMNS, Z_LEVELS, Z_POSITIONS,
};
use hbs_common::io::{DigitalIo, Outputs, Sensor};
use hbs_common::time::Clock;
use hbs_common::types::{Axis, SlotCoordinate, YPosition};
use tracing::{debug, info, trace};

use super::axis::AxisModel;
use super::clock::VirtualClock;

/// Conveyor run time after which a box on the output dock has left it.
const OUTPUT_CLEAR_S: f64 = 1.0;

/// Source of simulated time.
#[derive(Debug, Clone)]
pub enum TimeBase {
    /// Shared virtual clock, advanced by the control unit's ticks.
    Virtual(VirtualClock),
    /// Wall clock since the given origin.
    Wall(Instant),
}

impl TimeBase {
    /// Wall clock starting now.
    pub fn wall() -> Self {
        Self::Wall(Instant::now())
    }

    /// Elapsed time on this time base.
    pub fn now(&self) -> Duration {
        match self {
            Self::Virtual(clock) => clock.now(),
            Self::Wall(origin) => origin.elapsed(),
        }
    }
}

/// Input change queued for a future instant.
#[derive(Debug, Clone, Copy)]
struct PendingChange {
    /// When this change should be applied
    at: Duration,
    /// New emergency-stop state
    emergency_stop: bool,
}

/// Physics-based simulator of the rack I/O backplane.
pub struct RackSimulator {
    time: TimeBase,
    /// Time up to which the model has been integrated.
    synced: Duration,

    x: AxisModel,
    y: AxisModel,
    z: AxisModel,
    x_slow_factor: f64,

    /// Energized outputs.
    outputs: Outputs,
    /// Number of `set_port` calls.
    output_writes: u64,

    emergency_stop: bool,
    pending: VecDeque<PendingChange>,

    /// Shelf occupancy indexed by `slot_number - 1`.
    shelves: [bool; SLOT_COUNT as usize],
    carriage_loaded: bool,

    input_belt_queue: u32,
    input_belt_run_s: f64,
    belt_delivery_s: f64,
    input_dock_loaded: bool,
    barrier_dead: bool,

    output_dock_loaded: bool,
    output_belt_run_s: f64,
    delivered: u32,
}

impl RackSimulator {
    /// Create a simulator with the carriage at `config.start`.
    pub fn new(config: &SimulationConfig, time: TimeBase) -> Self {
        let window = config.sensor_window;
        let [x0, y0, z0] = config.start;
        let synced = time.now();

        info!(
            "RackSimulator initialized: X={x0} Y={y0} Z={z0}, sensor window {window}"
        );

        Self {
            time,
            synced,
            x: AxisModel::new("x", 1, X_COLUMNS, config.x_speed, window, x0),
            y: AxisModel::new("y", 0, 2, config.y_speed, window, y0),
            z: AxisModel::new("z", 1, Z_POSITIONS, config.z_speed, window, z0),
            x_slow_factor: config.x_slow_factor,
            outputs: Outputs::empty(),
            output_writes: 0,
            emergency_stop: false,
            pending: VecDeque::new(),
            shelves: [false; SLOT_COUNT as usize],
            carriage_loaded: false,
            input_belt_queue: 0,
            input_belt_run_s: 0.0,
            belt_delivery_s: config.belt_delivery_s,
            input_dock_loaded: false,
            barrier_dead: false,
            output_dock_loaded: false,
            output_belt_run_s: 0.0,
            delivered: 0,
        }
    }

    /// Simulator driven by a shared virtual clock.
    pub fn with_virtual_clock(config: &SimulationConfig, clock: &VirtualClock) -> Self {
        Self::new(config, TimeBase::Virtual(clock.clone()))
    }

    // ─── Physics ────────────────────────────────────────────────────

    /// Integrate the model up to the current time.
    fn sync(&mut self) {
        let now = self.time.now();
        while let Some(change) = self.pending.front().copied() {
            if change.at > now {
                break;
            }
            self.advance_to(change.at);
            self.pending.pop_front();
            debug!(
                at = ?change.at,
                pressed = change.emergency_stop,
                "Scheduled emergency stop applied"
            );
            self.emergency_stop = change.emergency_stop;
        }
        self.advance_to(now);
    }

    fn advance_to(&mut self, now: Duration) {
        if now <= self.synced {
            return;
        }
        let dt = (now - self.synced).as_secs_f64();
        self.synced = now;

        let out = self.outputs;
        let x_factor = if out.contains(Outputs::X_SLOW) {
            self.x_slow_factor
        } else {
            1.0
        };
        self.x
            .step(direction(out, Outputs::X_UP, Outputs::X_DOWN), x_factor, dt);
        self.y
            .step(direction(out, Outputs::Y_INSERT, Outputs::Y_RETRACT), 1.0, dt);
        let (z_old, z_new) = self
            .z
            .step(direction(out, Outputs::Z_UP, Outputs::Z_DOWN), 1.0, dt);
        if z_old != z_new {
            self.handle_z_travel(z_old, z_new);
        }

        self.run_conveyors(out, dt);
    }

    /// Pick or place a box when the fork passes a shelf floor.
    ///
    /// The floor of level `L` lies at `2L - 0.5`: travelling up through it
    /// lifts a box, travelling down sets it down.
    fn handle_z_travel(&mut self, old: f64, new: f64) {
        for level in 1..=Z_LEVELS {
            let floor = 2.0 * level as f64 - 0.5;
            if old < floor && new >= floor {
                self.pick(level);
            } else if old > floor && new <= floor {
                self.place(level);
            }
        }
    }

    fn pick(&mut self, level: u8) {
        if self.carriage_loaded {
            return;
        }
        match (self.y_aligned(), self.x.aligned()) {
            (Some(YPosition::Insert), Some(x)) => {
                if let Some(idx) = shelf_index(x, level).filter(|&idx| self.shelves[idx]) {
                    self.shelves[idx] = false;
                    self.carriage_loaded = true;
                    debug!(x, level, "Box lifted from shelf");
                }
            }
            (Some(YPosition::Retract), Some(INPUT_DOCK_X)) if level == 1 => {
                if self.input_dock_loaded {
                    self.input_dock_loaded = false;
                    self.carriage_loaded = true;
                    debug!("Box lifted from input dock");
                }
            }
            _ => {}
        }
    }

    fn place(&mut self, level: u8) {
        if !self.carriage_loaded {
            return;
        }
        match (self.y_aligned(), self.x.aligned()) {
            (Some(YPosition::Insert), Some(x)) => {
                if let Some(idx) = shelf_index(x, level).filter(|&idx| !self.shelves[idx]) {
                    self.shelves[idx] = true;
                    self.carriage_loaded = false;
                    debug!(x, level, "Box set down on shelf");
                }
            }
            (Some(YPosition::Retract), Some(OUTPUT_DOCK_X)) if level == 1 => {
                if !self.output_dock_loaded {
                    self.output_dock_loaded = true;
                    self.carriage_loaded = false;
                    debug!("Box set down on output dock");
                }
            }
            _ => {}
        }
    }

    fn run_conveyors(&mut self, out: Outputs, dt: f64) {
        if out.intersects(Outputs::INPUT_CONVEYOR) {
            self.input_belt_run_s += dt;
            if self.input_belt_run_s >= self.belt_delivery_s
                && self.input_belt_queue > 0
                && !self.input_dock_loaded
            {
                self.input_belt_queue -= 1;
                self.input_dock_loaded = true;
                self.input_belt_run_s = 0.0;
                debug!(queued = self.input_belt_queue, "Box arrived at input dock");
            }
        } else {
            self.input_belt_run_s = 0.0;
        }

        if out.intersects(Outputs::OUTPUT_CONVEYOR) {
            self.output_belt_run_s += dt;
            if self.output_dock_loaded && self.output_belt_run_s >= OUTPUT_CLEAR_S {
                self.output_dock_loaded = false;
                self.delivered += 1;
                debug!(delivered = self.delivered, "Box left output dock");
            }
        } else {
            self.output_belt_run_s = 0.0;
        }
    }

    fn y_aligned(&self) -> Option<YPosition> {
        self.y
            .aligned()
            .and_then(|rank| YPosition::from_rank(rank as i16))
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisModel {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Currently energized outputs.
    pub fn energized(&self) -> Outputs {
        self.outputs
    }

    /// Number of output pin writes since creation.
    pub fn output_writes(&self) -> u64 {
        self.output_writes
    }

    /// Simulated time.
    pub fn now(&self) -> Duration {
        self.time.now()
    }

    /// Carriage position on `axis` (Y in ranks).
    pub fn position(&mut self, axis: Axis) -> f64 {
        self.sync();
        self.axis_mut(axis).position()
    }

    /// Whether a box rides on the carriage fork.
    pub fn carriage_loaded(&mut self) -> bool {
        self.sync();
        self.carriage_loaded
    }

    /// Whether a box rests on the shelf at `slot`.
    pub fn shelf_occupied(&mut self, slot: SlotCoordinate) -> bool {
        self.sync();
        shelf_index(slot.x, slot.z_level).is_some_and(|idx| self.shelves[idx])
    }

    /// Whether a box waits at the input dock.
    pub fn input_dock_loaded(&mut self) -> bool {
        self.sync();
        self.input_dock_loaded
    }

    /// Whether a box sits on the output dock.
    pub fn output_dock_loaded(&mut self) -> bool {
        self.sync();
        self.output_dock_loaded
    }

    /// Boxes carried away by the output conveyor.
    pub fn delivered(&mut self) -> u32 {
        self.sync();
        self.delivered
    }

    // ─── Scenario setup ─────────────────────────────────────────────

    /// Teleport the carriage on `axis`.
    pub fn set_position(&mut self, axis: Axis, position: f64) {
        self.sync();
        self.axis_mut(axis).set_position(position);
    }

    /// Put `count` boxes on the intake belt.
    pub fn load_input_belt(&mut self, count: u32) {
        self.sync();
        self.input_belt_queue += count;
    }

    /// Place a box on the shelf at `slot`.
    pub fn set_shelf(&mut self, slot: SlotCoordinate, occupied: bool) {
        self.sync();
        if let Some(idx) = shelf_index(slot.x, slot.z_level) {
            self.shelves[idx] = occupied;
        }
    }

    /// Put a box on the carriage fork or take it away.
    pub fn set_carriage_loaded(&mut self, loaded: bool) {
        self.sync();
        self.carriage_loaded = loaded;
    }

    // ─── Fault injection ────────────────────────────────────────────

    /// Make `sensor` read as it would with its wire cut.
    ///
    /// Position sensors never assert; the light barrier stays asserted, so
    /// no box is ever seen at the input dock.
    pub fn fail_sensor(&mut self, sensor: Sensor) {
        self.sync();
        match sensor {
            Sensor::X(n) => self.x.kill_sensor(n),
            Sensor::Y(y) => self.y.kill_sensor(y.rank()),
            Sensor::Z(n) => self.z.kill_sensor(n),
            Sensor::InputBarrier => self.barrier_dead = true,
            Sensor::EmergencyStop => {}
        }
        info!(?sensor, "Sensor failure injected");
    }

    /// Restore every position sensor and the light barrier.
    pub fn heal_sensors(&mut self) {
        self.sync();
        self.x.heal_sensors();
        self.y.heal_sensors();
        self.z.heal_sensors();
        self.barrier_dead = false;
        info!("Sensors restored");
    }

    /// Block the motor of `axis`.
    pub fn jam(&mut self, axis: Axis, jammed: bool) {
        self.sync();
        self.axis_mut(axis).set_jammed(jammed);
        info!(%axis, jammed, "Axis jam state changed");
    }

    /// Press the emergency-stop button now.
    pub fn press_emergency_stop(&mut self) {
        self.sync();
        self.emergency_stop = true;
    }

    /// Release the emergency-stop button now.
    pub fn release_emergency_stop(&mut self) {
        self.sync();
        self.emergency_stop = false;
    }

    /// Press the emergency-stop button `after` from now.
    pub fn schedule_emergency_stop(&mut self, after: Duration) {
        self.sync();
        let at = self.time.now() + after;
        let idx = self.pending.partition_point(|p| p.at <= at);
        self.pending.insert(
            idx,
            PendingChange {
                at,
                emergency_stop: true,
            },
        );
    }
}

impl DigitalIo for RackSimulator {
    fn read_port(&mut self, port: u8) -> u8 {
        self.sync();
        if port >= INPUT_PORTS {
            return 0;
        }

        let mut asserted: Vec<Sensor> = Vec::with_capacity(5);
        asserted.extend(self.x.sensor().map(Sensor::X));
        asserted.extend(
            self.y
                .sensor()
                .and_then(|rank| YPosition::from_rank(rank as i16))
                .map(Sensor::Y),
        );
        asserted.extend(self.z.sensor().map(Sensor::Z));
        if self.barrier_dead || !self.input_dock_loaded {
            asserted.push(Sensor::InputBarrier);
        }
        if self.emergency_stop {
            asserted.push(Sensor::EmergencyStop);
        }

        asserted
            .into_iter()
            .filter_map(Sensor::address)
            .filter(|&(p, _)| p == port)
            .fold(0u8, |bits, (_, pin)| bits | (1 << pin))
    }

    fn set_port(&mut self, port: u8, pin: u8, value: bool) {
        self.sync();
        let output = Outputs::from_address(port, pin);
        self.outputs.set(output, value);
        self.output_writes += 1;
        trace!(port, pin, value, "Output written");
    }
}

/// Motion direction from a pair of opposing outputs.
fn direction(out: Outputs, positive: Outputs, negative: Outputs) -> i8 {
    match (out.contains(positive), out.contains(negative)) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

fn shelf_index(x: u8, level: u8) -> Option<usize> {
    SlotCoordinate::new(x, level).map(|c| c.slot_number().get() as usize - 1)
}
