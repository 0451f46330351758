#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Speed ramp that raises the panel speed multiplier over active play time.
//!
//! The multiplier grows linearly and is capped; editor pressure lifts the cap
//! until it is released or, when configured, until it expires on its own.

use std::time::Duration;

use panel_cut_core::{Command, DifficultyConfig, Event, ObstacleKind};
use tracing::{debug, info};

/// Pure system that owns the speed multiplier.
#[derive(Clone, Debug)]
pub struct Difficulty {
    config: DifficultyConfig,
    multiplier: f32,
    pressure: bool,
    pressure_elapsed: Duration,
}

impl Difficulty {
    /// Creates a controller starting at the configured initial multiplier.
    #[must_use]
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            multiplier: config.initial_multiplier,
            pressure: false,
            pressure_elapsed: Duration::ZERO,
            config,
        }
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Reports whether editor pressure currently lifts the cap.
    #[must_use]
    pub fn is_pressure_active(&self) -> bool {
        self.pressure
    }

    /// Cap in force for the current pressure state.
    #[must_use]
    pub fn cap(&self) -> f32 {
        if self.pressure {
            self.config.pressure_cap
        } else {
            self.config.normal_cap
        }
    }

    /// Ramps the multiplier by `ramp_rate * dt`, never beyond the active cap.
    pub fn tick(&mut self, dt: Duration) {
        let ramped = self.multiplier + self.config.ramp_rate * dt.as_secs_f32();
        self.multiplier = ramped.min(self.cap());

        if !self.pressure {
            return;
        }
        let Some(duration) = self.config.pressure_duration() else {
            return;
        };
        self.pressure_elapsed = self.pressure_elapsed.saturating_add(dt);
        if self.pressure_elapsed >= duration {
            debug!(
                elapsed = self.pressure_elapsed.as_secs_f32(),
                "editor pressure expired"
            );
            self.set_pressure(false);
        }
    }

    /// Turns editor pressure on or off.
    ///
    /// Activating restarts the expiry timer. Deactivating clamps the
    /// multiplier down to the normal cap at once.
    pub fn set_pressure(&mut self, active: bool) {
        self.pressure = active;
        self.pressure_elapsed = Duration::ZERO;
        if !active {
            self.multiplier = self.multiplier.min(self.config.normal_cap);
        }
    }

    /// Restores the initial multiplier and clears pressure.
    pub fn reset(&mut self) {
        self.multiplier = self.config.initial_multiplier;
        self.pressure = false;
        self.pressure_elapsed = Duration::ZERO;
    }

    /// Consumes world events and emits a multiplier update when it changed.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let before = self.multiplier;

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.tick(*dt),
                Event::ObstacleSpawned {
                    kind: ObstacleKind::EditorPressure,
                    ..
                } => {
                    info!("editor pressure started");
                    self.set_pressure(true);
                }
                Event::PressureReleased => self.set_pressure(false),
                _ => {}
            }
        }

        if self.multiplier.to_bits() != before.to_bits() {
            out.push(Command::SetSpeedMultiplier {
                multiplier: self.multiplier,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DifficultyConfig {
        DifficultyConfig {
            initial_multiplier: 1.0,
            ramp_rate: 0.5,
            normal_cap: 2.0,
            pressure_cap: 3.0,
            pressure_duration_secs: None,
        }
    }

    #[test]
    fn ramp_stops_at_normal_cap() {
        let mut difficulty = Difficulty::new(config());
        difficulty.tick(Duration::from_secs(1));
        assert!((difficulty.multiplier() - 1.5).abs() < 1e-6);

        difficulty.tick(Duration::from_secs(10));
        assert!((difficulty.multiplier() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn pressure_raises_cap_and_release_clamps_down() {
        let mut difficulty = Difficulty::new(config());
        difficulty.set_pressure(true);
        difficulty.tick(Duration::from_secs(10));
        assert!((difficulty.multiplier() - 3.0).abs() < 1e-6);

        difficulty.set_pressure(false);
        assert!(!difficulty.is_pressure_active());
        assert!((difficulty.multiplier() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn pressure_expires_after_configured_duration() {
        let mut difficulty = Difficulty::new(DifficultyConfig {
            pressure_duration_secs: Some(2.0),
            ..config()
        });
        difficulty.set_pressure(true);
        difficulty.tick(Duration::from_secs(1));
        assert!(difficulty.is_pressure_active());

        difficulty.tick(Duration::from_secs(1));
        assert!(!difficulty.is_pressure_active());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut difficulty = Difficulty::new(config());
        difficulty.set_pressure(true);
        difficulty.tick(Duration::from_secs(3));
        difficulty.reset();

        assert!(!difficulty.is_pressure_active());
        assert!((difficulty.multiplier() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn handle_emits_only_on_change() {
        let mut difficulty = Difficulty::new(DifficultyConfig {
            ramp_rate: 0.0,
            ..config()
        });
        let mut out = Vec::new();
        difficulty.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(1),
            }],
            &mut out,
        );
        assert!(out.is_empty());
    }
}
