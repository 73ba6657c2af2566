//! Fixed-period timers advanced by the simulation clock.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    period: Duration,
    next_due: Duration,
}

impl Timer {
    /// A timer that is due immediately.
    pub fn new(period: Duration) -> Self {
        Self { period, next_due: Duration::ZERO }
    }

    /// A timer whose first firing is one period after `now`.
    pub fn starting_at(period: Duration, now: Duration) -> Self {
        Self { period, next_due: now + period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_due
    }

    /// Fires at most once per call and re-arms relative to `now`, so a stalled clock
    /// never produces a burst of catch-up firings.
    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next_due = now + self.period;
        true
    }

    /// Makes the next poll fire regardless of the schedule.
    pub fn force(&mut self) {
        self.next_due = Duration::ZERO;
    }
}
