//! Axis physics model.
//!
//! A carriage axis is a point moving at constant speed along a ladder of
//! position sensors placed at integer positions `first..=last`. A sensor is
//! asserted while the point lies within `window` of it. Motion stops at hard
//! stops slightly beyond the ladder ends, where no sensor is asserted.

use tracing::trace;

/// Distance between the last sensor and the hard stop [units].
pub const HARD_STOP_MARGIN: f64 = 0.3;

/// Single-axis motion and sensor model.
#[derive(Debug, Clone)]
pub struct AxisModel {
    name: &'static str,
    /// Current position in sensor units.
    position: f64,
    /// Lowest sensor index.
    first: u8,
    /// Highest sensor index.
    last: u8,
    /// Full speed [units/s].
    speed: f64,
    /// Sensor half-width [units].
    window: f64,
    /// Bitmask of sensors that never assert (bit n = sensor n).
    dead: u32,
    /// Motor energized but the carriage does not move.
    jammed: bool,
}

impl AxisModel {
    /// Create an axis with sensors `first..=last` starting at `start`.
    pub fn new(
        name: &'static str,
        first: u8,
        last: u8,
        speed: f64,
        window: f64,
        start: f64,
    ) -> Self {
        let mut axis = Self {
            name,
            position: 0.0,
            first,
            last,
            speed,
            window,
            dead: 0,
            jammed: false,
        };
        axis.set_position(start);
        axis
    }

    /// Current position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Teleport the carriage, clamped to the hard stops.
    pub fn set_position(&mut self, position: f64) {
        self.position = position.clamp(self.lower_stop(), self.upper_stop());
    }

    /// Make sensor `n` permanently silent.
    pub fn kill_sensor(&mut self, n: u8) {
        if (self.first..=self.last).contains(&n) {
            self.dead |= 1 << n;
        }
    }

    /// Restore every sensor.
    pub fn heal_sensors(&mut self) {
        self.dead = 0;
    }

    /// Block or release the motor.
    pub fn set_jammed(&mut self, jammed: bool) {
        self.jammed = jammed;
    }

    fn lower_stop(&self) -> f64 {
        self.first as f64 - HARD_STOP_MARGIN
    }

    fn upper_stop(&self) -> f64 {
        self.last as f64 + HARD_STOP_MARGIN
    }

    /// Advance by `dt` seconds in `direction` (-1, 0, +1) at `factor` × speed.
    ///
    /// Returns `(old, new)` positions.
    pub fn step(&mut self, direction: i8, factor: f64, dt: f64) -> (f64, f64) {
        let old = self.position;
        if direction != 0 && !self.jammed {
            let delta = direction.signum() as f64 * self.speed * factor * dt;
            self.position = (old + delta).clamp(self.lower_stop(), self.upper_stop());
            trace!(axis = self.name, old, new = self.position, "step");
        }
        (old, self.position)
    }

    /// Asserted sensor index, if any.
    pub fn sensor(&self) -> Option<u8> {
        let nearest = self.position.round();
        if (nearest - self.position).abs() > self.window {
            return None;
        }
        if nearest < self.first as f64 || nearest > self.last as f64 {
            return None;
        }
        let n = nearest as u8;
        if self.dead & (1 << n) != 0 {
            None
        } else {
            Some(n)
        }
    }

    /// Integer position the carriage is aligned with, ignoring sensor faults.
    pub fn aligned(&self) -> Option<u8> {
        let nearest = self.position.round();
        ((nearest - self.position).abs() <= self.window
            && nearest >= self.first as f64
            && nearest <= self.last as f64)
            .then_some(nearest as u8)
    }
}
