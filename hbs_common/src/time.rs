//! Clock abstraction for poll loops.
//!
//! Every wait loop in the control unit is written against [`Clock`]: it
//! reads `now()`, compares against a deadline and calls `tick()` once per
//! iteration. The wall-clock implementation sleeps one tick period; the
//! simulator's virtual clock advances time deterministically instead.

use std::time::{Duration, Instant};

use crate::consts::TICK_US;

/// Monotonic time source and tick scheduler.
pub trait Clock: Send {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Wait for one poll tick.
    fn tick(&mut self);

    /// Dwell for a fixed duration (settle pauses, debounce).
    fn pause(&mut self, duration: Duration);
}

/// Wall-clock [`Clock`] ticking at a fixed period.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    tick: Duration,
}

impl SystemClock {
    /// Create a clock ticking every `tick`.
    pub fn new(tick: Duration) -> Self {
        Self {
            origin: Instant::now(),
            tick,
        }
    }

    /// Configured tick period.
    pub fn tick_period(&self) -> Duration {
        self.tick
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Duration::from_micros(TICK_US))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn tick(&mut self) {
        std::thread::sleep(self.tick);
    }

    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn tick(&mut self) {
        (**self).tick()
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}

/// Deadline that can be pushed forward while progress is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Duration,
    window: Duration,
}

impl Deadline {
    /// Deadline `window` after `now`.
    pub fn after(now: Duration, window: Duration) -> Self {
        Self {
            at: now + window,
            window,
        }
    }

    /// Push the deadline to a full window after `now`.
    pub fn renew(&mut self, now: Duration) {
        self.at = now + self.window;
    }

    /// Whether `now` is past the deadline.
    #[inline]
    pub fn expired(&self, now: Duration) -> bool {
        now > self.at
    }

    /// Instant of expiry.
    pub fn at(&self) -> Duration {
        self.at
    }
}
