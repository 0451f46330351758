//! Pausable play clock.

use std::time::Duration;

/// Accumulates play time while running and swallows time while paused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    elapsed: Duration,
    paused: bool,
}

impl Clock {
    /// Creates a running clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds frame time into the clock and returns the effective delta.
    ///
    /// The delta is `dt` while running and zero while paused; time that
    /// passes while paused is never replayed on resume.
    pub fn advance(&mut self, dt: Duration) -> Duration {
        if self.paused {
            return Duration::ZERO;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        dt
    }

    /// Play time accumulated while running.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reports whether the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stops time.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restarts time.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flips between paused and running, returning whether it is now paused.
    pub fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Returns to a running clock at zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
