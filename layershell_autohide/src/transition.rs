//! Linear margin transition.

use std::time::{Duration, Instant};

/// Time source for [`Transition`] sampling.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A time-bounded linear interpolation between two values.
///
/// The transition does not own a clock; every query takes the current time so
/// the owner decides where time comes from.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub start_value: f64,
    pub end_value: f64,
    duration: Duration,
    start_time: Instant,
}

impl Transition {
    /// An idle transition resting at 0.
    pub fn new(duration: Duration, now: Instant) -> Self {
        Self {
            start_value: 0.,
            end_value: 0.,
            duration,
            // NOTE: idle until the first start, whatever the duration
            start_time: now.checked_sub(duration).unwrap_or(now),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start(&mut self, from: f64, to: f64, now: Instant) {
        self.start_value = from;
        self.end_value = to;
        self.start_time = now;
    }

    /// Pin both ends to `value` without touching the start time.
    pub fn reset(&mut self, value: f64) {
        self.start_value = value;
        self.end_value = value;
    }

    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }

    pub fn running(&self, now: Instant) -> bool {
        self.elapsed(now) < self.duration
    }

    /// The interpolated value at `now`, clamped to `end_value` once finished.
    pub fn progress(&self, now: Instant) -> f64 {
        if !self.running(now) {
            return self.end_value;
        }
        let t = self.elapsed(now).as_secs_f64() / self.duration.as_secs_f64();
        self.start_value + (self.end_value - self.start_value) * t
    }
}
