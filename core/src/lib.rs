#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Panel Cut engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to deterministically. Systems keep their own small
//! state, consume event streams, and respond with new command or event batches.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::{
    CalendarConfig, DifficultyConfig, FieldConfig, IntervalRange, LivesConfig, ObstacleSpec,
    SessionConfig, StageDefinition,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Cut the panel before it passes the line.";

/// Factor converting the authored success range into field units.
///
/// Stage tables author the range in "line units"; a range of `0.5` therefore
/// accepts panels whose top edge lies within fifty field units of the line.
pub const RANGE_SCALE: f32 = 100.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the playfield and panel pool from the provided configuration.
    ConfigureField {
        /// Geometry, speed and pool capacity of the playfield.
        field: FieldConfig,
    },
    /// Moves the cut line, or removes it when `y` is `None`.
    SetThreshold {
        /// Vertical position of the line in field units.
        y: Option<f32>,
    },
    /// Replaces the speed multiplier applied to panel movement.
    SetSpeedMultiplier {
        /// Multiplier applied on top of the field's base speed.
        multiplier: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a panel be taken from the pool and started at the bottom.
    SpawnPanel {
        /// Horizontal position assigned to the panel.
        x: f32,
    },
    /// Announces that an obstacle was scheduled onto the field.
    SpawnObstacle {
        /// Type of obstacle to spawn.
        kind: ObstacleKind,
        /// Placement rule used to derive `x`.
        placement: Placement,
        /// Horizontal position assigned to the obstacle.
        x: f32,
    },
    /// Submits a single tap already filtered from UI chrome.
    Tap {
        /// Input that triggered the judgment.
        input: TapInput,
    },
    /// Ends editor pressure ahead of its natural expiry.
    ReleasePressure,
    /// Releases every panel and clears transient judgment state.
    ResetStage,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the playfield was rebuilt.
    FieldConfigured {
        /// Number of panels the pool can hold at once.
        capacity: usize,
    },
    /// Confirms that the cut line moved or disappeared.
    ThresholdChanged {
        /// New line position, `None` when judgment is unavailable.
        y: Option<f32>,
    },
    /// Confirms that a panel left the pool and started moving.
    PanelSpawned {
        /// Identifier of the pool slot that was activated.
        panel: PanelId,
        /// Horizontal position assigned to the panel.
        x: f32,
        /// Whether the panel needs a double tap to resolve.
        requires_double_tap: bool,
    },
    /// Reports that a spawn request was dropped.
    SpawnDropped {
        /// Reason the spawn could not be satisfied.
        reason: SpawnError,
    },
    /// Confirms that an obstacle appeared on the field.
    ObstacleSpawned {
        /// Type of obstacle that appeared.
        kind: ObstacleKind,
        /// Placement rule that positioned the obstacle.
        placement: Placement,
        /// Horizontal position of the obstacle.
        x: f32,
    },
    /// Confirms that editor pressure was released on request.
    PressureReleased,
    /// Reports that the first tap on a taped panel was recorded.
    TapArmed {
        /// Panel that now waits for its second tap.
        panel: PanelId,
    },
    /// Confirms that a panel was cut on the line.
    PanelHit {
        /// Panel that was resolved.
        panel: PanelId,
        /// Absolute distance between the panel's top edge and the line.
        offset: f32,
    },
    /// Reports that a panel was missed.
    PanelMissed {
        /// Panel that was resolved.
        panel: PanelId,
        /// What caused the miss.
        cause: MissCause,
    },
    /// Confirms that a panel returned to the pool.
    PanelRecycled {
        /// Pool slot that became free.
        panel: PanelId,
    },
    /// Reports that a tap did not resolve any panel.
    TapDiscarded {
        /// Reason the tap was discarded.
        reason: JudgmentError,
    },
    /// Confirms that the stage was reset and every panel released.
    StageReset,
    /// Announces that a new timeline started playing.
    StageStarted {
        /// Zero-based index of the stage.
        stage: u32,
        /// Number of scheduled events in the stage's timeline.
        scheduled: usize,
    },
    /// Announces that every scheduled event was consumed and the field is empty.
    StageCompleted {
        /// Zero-based index of the stage that completed.
        stage: u32,
    },
    /// Reports the remaining lives after a change.
    LivesChanged {
        /// Lives left after the change.
        lives: u32,
    },
    /// Signals that the last life was lost.
    GameOver,
    /// Reports that the simulated calendar moved forward.
    DateAdvanced {
        /// Date reached after advancing.
        date: NaiveDate,
    },
    /// Reports the clamped progress between the start and end dates.
    ProgressChanged {
        /// Progress fraction within `[0, 1]`.
        fraction: f32,
    },
    /// Signals that the end date was reached.
    GameCleared,
    /// Carries the summary record emitted when a run ends.
    RunFinished {
        /// Record handed to persistence.
        record: RunRecord,
    },
}

/// Unique identifier of a pool slot holding a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelId(u32);

impl PanelId {
    /// Creates a new panel identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Types of obstacles a stage may schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Objects thrown across the field.
    ThrowingObjects,
    /// Editor nagging for the manuscript; raises the speed cap while present.
    EditorPressure,
    /// Tape stuck over the cut line; the next panel needs a double tap.
    CutLineTape,
    /// Speech bubble covering part of the field.
    SpeechBubbleOverlay,
    /// A foot stepping into the field.
    SenseisenFoot,
    /// Doodles scribbled over the field.
    JoulDoodle,
}

impl ObstacleKind {
    /// Every obstacle kind in declaration order.
    pub const ALL: [ObstacleKind; 6] = [
        ObstacleKind::ThrowingObjects,
        ObstacleKind::EditorPressure,
        ObstacleKind::CutLineTape,
        ObstacleKind::SpeechBubbleOverlay,
        ObstacleKind::SenseisenFoot,
        ObstacleKind::JoulDoodle,
    ];
}

/// How a scheduled spawn chooses its horizontal position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Uniformly random inside the padded field width.
    #[default]
    Random,
    /// Centered on the field.
    Fixed,
}

/// What a scheduled event spawns when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    /// A falling panel to be cut.
    Cut,
    /// An obstacle of the provided kind.
    Obstacle(ObstacleKind),
}

/// Single entry of a stage timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScheduledEvent {
    fire_time: Duration,
    kind: SpawnKind,
    placement: Placement,
}

impl ScheduledEvent {
    /// Creates a scheduled event firing at `fire_time` after the stage starts.
    #[must_use]
    pub const fn new(fire_time: Duration, kind: SpawnKind, placement: Placement) -> Self {
        Self {
            fire_time,
            kind,
            placement,
        }
    }

    /// Offset from the start of the stage at which the event fires.
    #[must_use]
    pub const fn fire_time(&self) -> Duration {
        self.fire_time
    }

    /// What the event spawns.
    #[must_use]
    pub const fn kind(&self) -> SpawnKind {
        self.kind
    }

    /// Placement rule for the spawn.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }
}

/// Ordered schedule of spawns for one stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<ScheduledEvent>,
}

impl Timeline {
    /// Creates a timeline, stably sorting the events by fire time.
    ///
    /// Events sharing a fire time keep the order in which they were supplied.
    #[must_use]
    pub fn from_unsorted(mut events: Vec<ScheduledEvent>) -> Self {
        events.sort_by_key(ScheduledEvent::fire_time);
        Self { events }
    }

    /// Creates a timeline without any scheduled events.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scheduled events in non-decreasing fire time order.
    #[must_use]
    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    /// Number of scheduled events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Reports whether the timeline has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Fire time of the final event, if any.
    #[must_use]
    pub fn last_fire_time(&self) -> Option<Duration> {
        self.events.last().map(ScheduledEvent::fire_time)
    }

    /// Number of scheduled panel spawns.
    #[must_use]
    pub fn cut_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.kind() == SpawnKind::Cut)
            .count()
    }
}

/// Lifecycle state of a pooled panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelState {
    /// Parked in the pool.
    Inactive,
    /// Moving and eligible for judgment.
    Waiting,
    /// Judged; waits to leave the screen.
    Resolved(Resolution),
}

/// Terminal outcome of a panel's judgment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Cut within the success range.
    Hit,
    /// Tapped outside the success range.
    Missed,
    /// Crossed the line without being tapped.
    PassedWithoutTouch,
}

/// Reason a panel counted as a miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MissCause {
    /// The resolving tap landed outside the success range.
    OutOfRange,
    /// The panel crossed the line while still waiting.
    PassedLine,
    /// The panel left the screen while still waiting.
    LeftScreen,
}

/// Tap or click delivered by the input source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapInput {
    /// Horizontal screen coordinate of the tap.
    pub screen_x: f32,
    /// Vertical screen coordinate of the tap.
    pub screen_y: f32,
    /// Session time at which the tap happened.
    pub timestamp: Duration,
}

impl TapInput {
    /// Creates a tap at the provided coordinates and timestamp.
    #[must_use]
    pub const fn new(screen_x: f32, screen_y: f32, timestamp: Duration) -> Self {
        Self {
            screen_x,
            screen_y,
            timestamp,
        }
    }
}

/// Immutable representation of a single panel used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelSnapshot {
    /// Pool slot occupied by the panel.
    pub id: PanelId,
    /// Current lifecycle state.
    pub state: PanelState,
    /// Vertical offset of the panel's center.
    pub position_y: f32,
    /// Vertical offset of the panel's top edge.
    pub top_edge_y: f32,
    /// Horizontal position of the panel.
    pub x: f32,
    /// Whether the panel needs a double tap to resolve.
    pub requires_double_tap: bool,
    /// Whether the panel still shows its line indicator.
    pub line_visible: bool,
}

/// Read-only snapshot describing every active panel.
#[derive(Clone, Debug, Default)]
pub struct PanelView {
    snapshots: Vec<PanelSnapshot>,
}

impl PanelView {
    /// Creates a new panel view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PanelSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured panel snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PanelSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured panels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no panels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PanelSnapshot> {
        self.snapshots
    }
}

/// Summary handed to persistence when a run ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Calendar date reached, formatted as `YYYY. MM. DD`.
    pub date_reached: String,
    /// Play time of the run in seconds.
    pub elapsed_seconds: f32,
    /// Whether the run reached the end date.
    pub cleared: bool,
}

impl RunRecord {
    /// Format used for [`RunRecord::date_reached`].
    pub const DATE_FORMAT: &'static str = "%Y. %m. %d";

    /// Builds a record from the reached date and play time.
    #[must_use]
    pub fn new(date: NaiveDate, elapsed: Duration, cleared: bool) -> Self {
        Self {
            date_reached: date.format(Self::DATE_FORMAT).to_string(),
            elapsed_seconds: elapsed.as_secs_f32(),
            cleared,
        }
    }
}

/// Reasons a spawn request may be dropped by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SpawnError {
    /// Every pool slot is active.
    #[error("panel pool exhausted")]
    PoolExhausted,
}

/// Reasons a tap may fail to resolve a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum JudgmentError {
    /// No panel is waiting for a tap.
    #[error("no panel is waiting for a tap")]
    NoEligibleTarget,
    /// The cut line is missing, so nothing can be judged.
    #[error("cut line unavailable")]
    ThresholdUnavailable,
}

/// Reasons a static configuration table may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The interval's lower bound exceeds its upper bound or is negative.
    #[error("invalid spawn interval [{min}, {max}]")]
    InvertedInterval {
        /// Lower bound in seconds.
        min: f32,
        /// Upper bound in seconds.
        max: f32,
    },
    /// No stage definitions were supplied.
    #[error("at least one stage definition is required")]
    EmptyStages,
    /// The panel pool would not hold a single panel.
    #[error("panel pool capacity must be non-zero")]
    ZeroPoolCapacity,
    /// The calendar's end date precedes its start date.
    #[error("calendar end {end} precedes start {start}")]
    InvalidCalendar {
        /// First date of the run.
        start: NaiveDate,
        /// Date that clears the run.
        end: NaiveDate,
    },
    /// The speed caps or ramp are not usable.
    #[error("invalid speed caps: normal {normal}, pressure {pressure}")]
    InvalidCap {
        /// Cap applied without pressure.
        normal: f32,
        /// Cap applied under pressure.
        pressure: f32,
    },
    /// A playfield value is not finite or out of its usable range.
    #[error("invalid field value {name} = {value}")]
    InvalidField {
        /// Name of the offending field.
        name: &'static str,
        /// Value that was supplied.
        value: f32,
    },
    /// Panels would be recycled before they enter the field.
    #[error("off-screen bound {offscreen_y} does not lie below spawn position {spawn_y}")]
    InvalidFieldBounds {
        /// Vertical spawn offset.
        spawn_y: f32,
        /// Vertical recycle bound.
        offscreen_y: f32,
    },
    /// A duration in seconds cannot be represented.
    #[error("invalid duration {name} = {secs}s")]
    InvalidDuration {
        /// Name of the offending field.
        name: &'static str,
        /// Value that was supplied.
        secs: f32,
    },
}

/// Receives callbacks for the observable outcomes of a session.
///
/// Renderers and persistence implement this trait; every method defaults to a
/// no-op so implementors only override what they present.
pub trait SessionObserver {
    /// A panel left the pool.
    fn on_spawn(&mut self, _panel: PanelId, _x: f32, _requires_double_tap: bool) {}

    /// An obstacle appeared.
    fn on_obstacle(&mut self, _kind: ObstacleKind, _x: f32) {}

    /// A panel was cut on the line.
    fn on_hit(&mut self, _panel: PanelId) {}

    /// A panel was missed.
    fn on_miss(&mut self, _panel: PanelId, _cause: MissCause) {}

    /// A panel returned to the pool.
    fn on_recycle(&mut self, _panel: PanelId) {}

    /// Lives changed.
    fn on_lives_changed(&mut self, _lives: u32) {}

    /// The calendar moved forward.
    fn on_date_changed(&mut self, _date: NaiveDate) {}

    /// The progress fraction changed.
    fn on_progress_changed(&mut self, _fraction: f32) {}

    /// The last life was lost.
    fn on_game_over(&mut self) {}

    /// The end date was reached.
    fn on_cleared(&mut self) {}

    /// The run ended and produced a record.
    fn on_run_finished(&mut self, _record: &RunRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_sort_keeps_insertion_order_for_ties() {
        let at = |secs| Duration::from_secs(secs);
        let timeline = Timeline::from_unsorted(vec![
            ScheduledEvent::new(at(2), SpawnKind::Cut, Placement::Random),
            ScheduledEvent::new(at(1), SpawnKind::Cut, Placement::Fixed),
            ScheduledEvent::new(
                at(1),
                SpawnKind::Obstacle(ObstacleKind::JoulDoodle),
                Placement::Random,
            ),
        ]);

        let kinds: Vec<_> = timeline.events().iter().map(ScheduledEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SpawnKind::Cut,
                SpawnKind::Obstacle(ObstacleKind::JoulDoodle),
                SpawnKind::Cut,
            ]
        );
        assert_eq!(timeline.events()[0].placement(), Placement::Fixed);
        assert_eq!(timeline.last_fire_time(), Some(at(2)));
        assert_eq!(timeline.cut_count(), 2);
    }

    #[test]
    fn panel_view_orders_snapshots_by_id() {
        let snapshot = |id| PanelSnapshot {
            id: PanelId::new(id),
            state: PanelState::Waiting,
            position_y: 0.0,
            top_edge_y: 10.0,
            x: 0.0,
            requires_double_tap: false,
            line_visible: true,
        };
        let view = PanelView::from_snapshots(vec![snapshot(3), snapshot(1), snapshot(2)]);
        let ids: Vec<_> = view.iter().map(|panel| panel.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn run_record_formats_reached_date() {
        let date = NaiveDate::from_ymd_opt(2010, 3, 8).expect("valid date");
        let record = RunRecord::new(date, Duration::from_millis(12_500), false);
        assert_eq!(record.date_reached, "2010. 03. 08");
        assert!((record.elapsed_seconds - 12.5).abs() < f32::EPSILON);
        assert!(!record.cleared);
    }

    #[test]
    fn run_record_round_trips_through_bincode() {
        let date = NaiveDate::from_ymd_opt(2020, 7, 27).expect("valid date");
        let record = RunRecord::new(date, Duration::from_secs(90), true);
        let bytes = bincode::serialize(&record).expect("serialize");
        let restored: RunRecord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, record);
    }
}
