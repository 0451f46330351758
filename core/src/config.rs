//! Static data tables supplied when a session starts.
//!
//! Every table deserializes from the adapter's config file and falls back to
//! the tuning the game shipped with for any field left out.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ObstacleKind, Placement, RANGE_SCALE};

/// Geometry, speed and judgment tuning of the playfield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Width of the field in field units.
    pub screen_width: f32,
    /// Height of the field in field units.
    pub screen_height: f32,
    /// Height of a single panel.
    pub panel_height: f32,
    /// Vertical offset at which panels enter the field.
    pub spawn_y: f32,
    /// Distance above the screen height after which panels are recycled.
    pub offscreen_margin: f32,
    /// Horizontal margin kept free on both sides when placing panels randomly.
    pub padding: f32,
    /// Initial cut line position; `None` starts without a line.
    pub threshold_y: Option<f32>,
    /// Panel speed in field units per second before the multiplier.
    pub base_speed: f32,
    /// Authored success range; scaled by [`RANGE_SCALE`].
    pub success_range: f32,
    /// Window in seconds within which a taped panel's second tap counts.
    pub double_tap_window_secs: f32,
    /// Number of panels that may be active at once.
    pub pool_capacity: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            screen_width: 1080.0,
            screen_height: 1920.0,
            panel_height: 400.0,
            spawn_y: -960.0,
            offscreen_margin: 100.0,
            padding: 50.0,
            threshold_y: Some(600.0),
            base_speed: 200.0,
            success_range: 0.5,
            double_tap_window_secs: 0.3,
            pool_capacity: 10,
        }
    }
}

impl FieldConfig {
    /// Half of the panel height; the top edge sits this far above the center.
    #[must_use]
    pub fn half_height(&self) -> f32 {
        self.panel_height / 2.0
    }

    /// Vertical bound past which panels are recycled.
    #[must_use]
    pub fn offscreen_y(&self) -> f32 {
        self.screen_height + self.offscreen_margin
    }

    /// Maximum distance between top edge and line that still counts as a hit.
    #[must_use]
    pub fn success_distance(&self) -> f32 {
        self.success_range * RANGE_SCALE
    }

    /// Window within which a taped panel's second tap resolves it.
    ///
    /// Collapses to zero when the configured seconds are not representable.
    #[must_use]
    pub fn double_tap_window(&self) -> Duration {
        Duration::try_from_secs_f32(self.double_tap_window_secs).unwrap_or(Duration::ZERO)
    }

    /// Checks that the geometry lets panels travel from spawn to recycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::ZeroPoolCapacity);
        }

        let finite = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("panel_height", self.panel_height),
            ("spawn_y", self.spawn_y),
            ("offscreen_margin", self.offscreen_margin),
            ("padding", self.padding),
            ("threshold_y", self.threshold_y.unwrap_or_default()),
        ];
        if let Some(&(name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::InvalidField { name, value });
        }
        if !(self.panel_height >= 0.0) {
            return Err(ConfigError::InvalidField {
                name: "panel_height",
                value: self.panel_height,
            });
        }
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(ConfigError::InvalidField {
                name: "base_speed",
                value: self.base_speed,
            });
        }
        if !(self.success_range.is_finite() && self.success_range >= 0.0) {
            return Err(ConfigError::InvalidField {
                name: "success_range",
                value: self.success_range,
            });
        }
        if !(self.offscreen_y() > self.spawn_y) {
            return Err(ConfigError::InvalidFieldBounds {
                spawn_y: self.spawn_y,
                offscreen_y: self.offscreen_y(),
            });
        }
        if Duration::try_from_secs_f32(self.double_tap_window_secs).is_err() {
            return Err(ConfigError::InvalidDuration {
                name: "double_tap_window_secs",
                secs: self.double_tap_window_secs,
            });
        }
        Ok(())
    }

    /// Horizontal span available to randomly placed spawns.
    ///
    /// Collapses to the center when the padding leaves no room.
    #[must_use]
    pub fn spawn_span(&self) -> (f32, f32) {
        let half_width = self.screen_width / 2.0;
        let min = -half_width + self.padding;
        let max = half_width - self.padding;
        if min <= max {
            (min, max)
        } else {
            (0.0, 0.0)
        }
    }
}

/// Inclusive range of gaps, in seconds, drawn between scheduled events.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntervalRange {
    min: f32,
    max: f32,
}

impl Default for IntervalRange {
    fn default() -> Self {
        Self { min: 1.0, max: 2.0 }
    }
}

impl IntervalRange {
    /// Creates a range, rejecting negative, non-finite or inverted bounds.
    pub fn new(min: f32, max: f32) -> Result<Self, ConfigError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Lower bound in seconds.
    #[must_use]
    pub const fn min_secs(&self) -> f32 {
        self.min
    }

    /// Upper bound in seconds.
    #[must_use]
    pub const fn max_secs(&self) -> f32 {
        self.max
    }

    /// Checks the bounds of a deserialized range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let usable = self.min.is_finite() && self.max.is_finite() && self.min >= 0.0;
        if usable && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvertedInterval {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Batch of obstacles scheduled within a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Type of obstacle.
    pub kind: ObstacleKind,
    /// Number of obstacles in the batch.
    pub count: u32,
    /// Placement rule for every obstacle in the batch.
    #[serde(default)]
    pub placement: Placement,
}

impl ObstacleSpec {
    /// Creates a batch of `count` obstacles of `kind`.
    #[must_use]
    pub const fn new(kind: ObstacleKind, count: u32, placement: Placement) -> Self {
        Self {
            kind,
            count,
            placement,
        }
    }
}

/// Contents of a single stage, one simulated month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Number of panels to cut.
    pub cut_count: u32,
    /// Obstacle batches mixed into the stage.
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    /// Gap range between consecutive events of one batch.
    #[serde(default)]
    pub interval: IntervalRange,
}

impl StageDefinition {
    /// Creates a stage with only panels and the default interval.
    #[must_use]
    pub fn cuts(cut_count: u32) -> Self {
        Self {
            cut_count,
            obstacles: Vec::new(),
            interval: IntervalRange::default(),
        }
    }

    /// Total number of events the stage's timeline will hold.
    #[must_use]
    pub fn event_count(&self) -> usize {
        let obstacles: u64 = self.obstacles.iter().map(|spec| u64::from(spec.count)).sum();
        usize::try_from(u64::from(self.cut_count) + obstacles).unwrap_or(usize::MAX)
    }
}

/// Speed ramp and caps of the difficulty controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Multiplier at the start of a run.
    pub initial_multiplier: f32,
    /// Growth of the multiplier per second of active play.
    pub ramp_rate: f32,
    /// Cap while editor pressure is inactive.
    pub normal_cap: f32,
    /// Cap while editor pressure is active.
    pub pressure_cap: f32,
    /// Seconds after which pressure ends on its own; `None` waits for a toggle.
    pub pressure_duration_secs: Option<f32>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            initial_multiplier: 1.0,
            ramp_rate: 0.05,
            normal_cap: 2.0,
            pressure_cap: 3.0,
            pressure_duration_secs: Some(8.0),
        }
    }
}

impl DifficultyConfig {
    /// Time after which pressure expires on its own.
    ///
    /// Zero or unrepresentable seconds mean pressure never expires.
    #[must_use]
    pub fn pressure_duration(&self) -> Option<Duration> {
        self.pressure_duration_secs
            .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
            .filter(|duration| !duration.is_zero())
    }

    /// Checks that the caps are ordered and the ramp is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.initial_multiplier,
            self.ramp_rate,
            self.normal_cap,
            self.pressure_cap,
        ]
        .iter()
        .all(|value| value.is_finite());
        if !(finite && self.ramp_rate >= 0.0 && self.normal_cap <= self.pressure_cap) {
            return Err(ConfigError::InvalidCap {
                normal: self.normal_cap,
                pressure: self.pressure_cap,
            });
        }
        if let Some(secs) = self.pressure_duration_secs {
            if Duration::try_from_secs_f32(secs).is_err() {
                return Err(ConfigError::InvalidDuration {
                    name: "pressure_duration_secs",
                    secs,
                });
            }
        }
        Ok(())
    }
}

/// Size of the life counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivesConfig {
    /// Lives at the start of a run.
    pub max_lives: u32,
}

impl Default for LivesConfig {
    fn default() -> Self {
        Self { max_lives: 3 }
    }
}

/// Simulated calendar the run advances through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Date at the start of a run.
    pub start: NaiveDate,
    /// Date that clears the run.
    pub end: NaiveDate,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start: calendar_date(2006, 9, 8),
            end: calendar_date(2020, 7, 27),
        }
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Every static table a session needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for gap and placement sampling.
    pub seed: u64,
    /// Playfield tuning.
    pub field: FieldConfig,
    /// Difficulty tuning.
    pub difficulty: DifficultyConfig,
    /// Life counter tuning.
    pub lives: LivesConfig,
    /// Calendar bounds.
    pub calendar: CalendarConfig,
    /// Stage sequence; stages past the end reuse the last definition.
    pub stages: Vec<StageDefinition>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let interval = IntervalRange::default();
        Self {
            seed: 0x5eed_c47_1a5e,
            field: FieldConfig::default(),
            difficulty: DifficultyConfig::default(),
            lives: LivesConfig::default(),
            calendar: CalendarConfig::default(),
            stages: vec![
                StageDefinition::cuts(3),
                StageDefinition {
                    cut_count: 4,
                    obstacles: vec![ObstacleSpec::new(
                        ObstacleKind::CutLineTape,
                        1,
                        Placement::Fixed,
                    )],
                    interval,
                },
                StageDefinition {
                    cut_count: 5,
                    obstacles: vec![
                        ObstacleSpec::new(ObstacleKind::EditorPressure, 1, Placement::Fixed),
                        ObstacleSpec::new(ObstacleKind::ThrowingObjects, 2, Placement::Random),
                    ],
                    interval,
                },
            ],
        }
    }
}

impl SessionConfig {
    /// Validates every table, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::EmptyStages);
        }
        self.field.validate()?;
        if self.calendar.end < self.calendar.start {
            return Err(ConfigError::InvalidCalendar {
                start: self.calendar.start,
                end: self.calendar.end,
            });
        }
        self.difficulty.validate()?;
        for stage in &self.stages {
            stage.interval.validate()?;
        }
        Ok(())
    }

    /// Definition used for the stage at `index`.
    #[must_use]
    pub fn stage(&self, index: u32) -> Option<&StageDefinition> {
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        self.stages.get(index).or_else(|| self.stages.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_interval_is_rejected() {
        assert!(matches!(
            IntervalRange::new(2.0, 1.0),
            Err(ConfigError::InvertedInterval { .. })
        ));
        assert!(IntervalRange::new(-1.0, 1.0).is_err());
        assert!(IntervalRange::new(0.5, 0.5).is_ok());
    }

    #[test]
    fn empty_stage_list_is_rejected() {
        let config = SessionConfig {
            stages: Vec::new(),
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyStages));
    }

    #[test]
    fn stages_past_the_end_reuse_the_last_definition() {
        let config = SessionConfig::default();
        let last = config.stages.last().cloned();
        assert_eq!(config.stage(0), config.stages.first());
        assert_eq!(config.stage(40).cloned(), last);
    }

    #[test]
    fn success_distance_scales_authored_range() {
        let field = FieldConfig {
            success_range: 0.5,
            ..FieldConfig::default()
        };
        assert!((field.success_distance() - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn spawn_span_collapses_when_padding_exceeds_width() {
        let field = FieldConfig {
            screen_width: 80.0,
            padding: 50.0,
            ..FieldConfig::default()
        };
        assert_eq!(field.spawn_span(), (0.0, 0.0));
    }

    #[test]
    fn unusable_field_values_are_rejected() {
        let cases = [
            (
                FieldConfig {
                    base_speed: -200.0,
                    ..FieldConfig::default()
                },
                "base_speed",
            ),
            (
                FieldConfig {
                    base_speed: f32::NAN,
                    ..FieldConfig::default()
                },
                "base_speed",
            ),
            (
                FieldConfig {
                    success_range: -0.5,
                    ..FieldConfig::default()
                },
                "success_range",
            ),
            (
                FieldConfig {
                    spawn_y: f32::INFINITY,
                    ..FieldConfig::default()
                },
                "spawn_y",
            ),
        ];

        for (field, expected) in cases {
            match field.validate() {
                Err(ConfigError::InvalidField { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn recycle_bound_above_spawn_is_rejected() {
        let field = FieldConfig {
            spawn_y: 3000.0,
            ..FieldConfig::default()
        };
        assert_eq!(
            field.validate(),
            Err(ConfigError::InvalidFieldBounds {
                spawn_y: 3000.0,
                offscreen_y: 2020.0,
            })
        );
    }

    #[test]
    fn unrepresentable_double_tap_window_is_rejected() {
        for secs in [1e20, f32::INFINITY, -0.3] {
            let field = FieldConfig {
                double_tap_window_secs: secs,
                ..FieldConfig::default()
            };
            assert!(matches!(
                field.validate(),
                Err(ConfigError::InvalidDuration { name: "double_tap_window_secs", .. })
            ));
            assert_eq!(field.double_tap_window(), Duration::ZERO);
        }
    }

    #[test]
    fn unrepresentable_pressure_duration_is_rejected() {
        let difficulty = DifficultyConfig {
            pressure_duration_secs: Some(1e30),
            ..DifficultyConfig::default()
        };
        assert!(matches!(
            difficulty.validate(),
            Err(ConfigError::InvalidDuration { name: "pressure_duration_secs", .. })
        ));
        assert_eq!(difficulty.pressure_duration(), None);

        let endless = DifficultyConfig {
            pressure_duration_secs: Some(0.0),
            ..DifficultyConfig::default()
        };
        assert_eq!(endless.validate(), Ok(()));
        assert_eq!(endless.pressure_duration(), None);
    }

    #[test]
    fn stage_table_parses_from_toml() {
        let table = r#"
            seed = 7

            [calendar]
            start = "2006-09-08"
            end = "2007-01-08"

            [[stages]]
            cut_count = 2
            interval = { min = 0.5, max = 1.5 }

            [[stages.obstacles]]
            kind = "cut_line_tape"
            count = 1
            placement = "fixed"
        "#;

        let config: SessionConfig = toml::from_str(table).expect("config parses");
        assert_eq!(config.seed, 7);
        assert_eq!(config.stages.len(), 1);
        assert_eq!(config.stages[0].event_count(), 3);
        assert_eq!(
            config.stages[0].obstacles[0],
            ObstacleSpec::new(ObstacleKind::CutLineTape, 1, Placement::Fixed)
        );
        assert_eq!(config.field, FieldConfig::default());
        assert_eq!(config.validate(), Ok(()));
    }
}
