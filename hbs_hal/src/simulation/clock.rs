//! Virtual clock shared between the control unit and the simulator.
//!
//! Time only advances when the control unit ticks or pauses, so stall
//! windows and conveyor runs behave identically on every run.

use hbs_common::time::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cloneable handle to a shared virtual time line.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    nanos: Arc<AtomicU64>,
    tick: Duration,
}

impl VirtualClock {
    /// Create a clock at time zero, advancing `tick` per poll tick.
    pub fn new(tick: Duration) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(0)),
            tick,
        }
    }

    /// Advance time by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn tick(&mut self) {
        self.advance(self.tick);
    }

    fn pause(&mut self, duration: Duration) {
        self.advance(duration);
    }
}
