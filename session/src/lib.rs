#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-threaded game session for Panel Cut.
//!
//! A [`Session`] owns the world and every system and advances them in a fixed
//! order once per frame:
//!
//! 1. the pausable [`Clock`],
//! 2. the timeline player,
//! 3. queued spawns and adapter commands,
//! 4. panel movement and line checks,
//! 5. taps,
//! 6. the difficulty ramp,
//! 7. the life counter,
//! 8. stage completion and calendar progress.
//!
//! The events of a frame are returned to the caller and forwarded to every
//! subscribed [`SessionObserver`] in subscription order.

mod clock;

use std::time::Duration;

use panel_cut_core::{
    Command, ConfigError, Event, RunRecord, SessionConfig, SessionObserver, TapInput,
};
use panel_cut_system_difficulty::Difficulty;
use panel_cut_system_lives::Lives;
use panel_cut_system_progress::ProgressTracker;
use panel_cut_system_timeline::{TimelineGenerator, TimelinePlayer};
use panel_cut_world::{self as world, query, World};
use tracing::info;

pub use clock::Clock;

const PLACEMENT_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Coarse lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Frames advance the game.
    Running,
    /// Frames are ignored until resumed.
    Paused,
    /// The last life was lost.
    GameOver,
    /// The calendar reached the end date.
    Cleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    GameOver,
    Cleared,
}

/// Owns the world and systems of one run and drives them frame by frame.
pub struct Session {
    config: SessionConfig,
    clock: Clock,
    world: World,
    generator: TimelineGenerator,
    player: TimelinePlayer,
    difficulty: Difficulty,
    progress: ProgressTracker,
    lives: Lives,
    observers: Vec<Box<dyn SessionObserver>>,
    queued: Vec<Command>,
    stage: u32,
    outcome: Option<Outcome>,
    events: Vec<Event>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("stage", &self.stage)
            .field("state", &self.state())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Validates `config` and starts the first stage.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut session = Self {
            clock: Clock::new(),
            world: World::new(),
            generator: TimelineGenerator::new(config.seed),
            player: TimelinePlayer::new(placement_seed(config.seed), config.field.spawn_span()),
            difficulty: Difficulty::new(config.difficulty.clone()),
            progress: ProgressTracker::new(config.calendar),
            lives: Lives::new(config.lives),
            observers: Vec::new(),
            queued: Vec::new(),
            stage: 0,
            outcome: None,
            events: Vec::new(),
            config,
        };

        let field = session.config.field.clone();
        let multiplier = session.difficulty.multiplier();
        session.apply(Command::ConfigureField { field });
        session.apply(Command::SetSpeedMultiplier { multiplier });
        session.start_stage();
        session.events.clear();
        Ok(session)
    }

    /// Registers an observer; observers are notified in subscription order.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Advances the session by one frame and returns the frame's events.
    ///
    /// Taps are judged after movement, in the order supplied. Frames are
    /// ignored while paused and once the run has ended.
    pub fn tick(&mut self, dt: Duration, taps: &[TapInput]) -> &[Event] {
        self.events.clear();
        if self.outcome.is_some() || self.clock.is_paused() {
            return &self.events;
        }

        let dt = self.clock.advance(dt);

        let mut commands = Vec::new();
        self.player.advance(dt, &mut commands);
        commands.append(&mut self.queued);
        for command in commands {
            self.apply(command);
        }

        self.apply(Command::Tick { dt });

        for tap in taps {
            self.apply(Command::Tap { input: *tap });
        }

        let mut commands = Vec::new();
        self.difficulty.handle(&self.events, &mut commands);
        for command in commands {
            self.apply(command);
        }

        let mut lives_events = Vec::new();
        self.lives.handle(&self.events, &mut lives_events);
        let game_over = lives_events.contains(&Event::GameOver);
        self.events.extend(lives_events);

        if game_over {
            self.finish(Outcome::GameOver);
        } else if self.player.is_exhausted() && query::active_panel_count(&self.world) == 0 {
            self.complete_stage();
        }

        dispatch(&mut self.observers, &self.events);
        &self.events
    }

    /// Queues a cut line move for the next frame.
    pub fn set_threshold(&mut self, y: Option<f32>) {
        self.queued.push(Command::SetThreshold { y });
    }

    /// Queues the early end of editor pressure for the next frame.
    pub fn release_pressure(&mut self) {
        self.queued.push(Command::ReleasePressure);
    }

    /// Restarts the run from the first stage.
    ///
    /// Every panel returns to the pool, pending spawns and taps are dropped,
    /// and the systems and the clock return to their initial state before
    /// the first stage starts again. Observers receive the resulting events
    /// right away.
    pub fn reset(&mut self) -> &[Event] {
        self.events.clear();
        self.queued.clear();
        self.apply(Command::ResetStage);
        let field = self.config.field.clone();
        self.apply(Command::ConfigureField { field });

        self.generator = TimelineGenerator::new(self.config.seed);
        self.player = TimelinePlayer::new(
            placement_seed(self.config.seed),
            self.config.field.spawn_span(),
        );
        self.difficulty.reset();
        let multiplier = self.difficulty.multiplier();
        self.apply(Command::SetSpeedMultiplier { multiplier });
        self.progress.reset();
        self.lives.reset();
        self.clock.reset();
        self.outcome = None;
        self.stage = 0;

        self.events.push(Event::LivesChanged {
            lives: self.lives.lives(),
        });
        self.events.push(Event::ProgressChanged {
            fraction: self.progress.progress(),
        });
        self.start_stage();
        info!("session reset");

        dispatch(&mut self.observers, &self.events);
        &self.events
    }

    /// Stops the clock; frames are ignored until resumed.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Restarts the clock.
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Flips the pause state and returns whether the session is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.clock.toggle()
    }

    /// Reports whether the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.outcome {
            Some(Outcome::GameOver) => SessionState::GameOver,
            Some(Outcome::Cleared) => SessionState::Cleared,
            None if self.clock.is_paused() => SessionState::Paused,
            None => SessionState::Running,
        }
    }

    /// Read-only access to the world for rendering.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Zero-based index of the stage being played.
    #[must_use]
    pub fn stage_index(&self) -> u32 {
        self.stage
    }

    /// Play time accumulated while running.
    #[must_use]
    pub fn play_time(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives.lives()
    }

    /// Calendar tracker of the run.
    #[must_use]
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.difficulty.multiplier()
    }

    /// Configuration the session was built from.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn start_stage(&mut self) {
        let Some(definition) = self.config.stage(self.stage) else {
            return;
        };
        let timeline = self.generator.generate(
            definition.cut_count,
            &definition.obstacles,
            definition.interval,
        );
        let scheduled = timeline.len();
        self.player.load(timeline);

        info!(stage = self.stage, scheduled, "stage started");
        self.events.push(Event::StageStarted {
            stage: self.stage,
            scheduled,
        });
    }

    fn complete_stage(&mut self) {
        let completed = Event::StageCompleted { stage: self.stage };
        info!(stage = self.stage, "stage completed");
        self.events.push(completed.clone());

        let mut progress_events = Vec::new();
        self.progress.handle(&[completed], &mut progress_events);
        let cleared = progress_events.contains(&Event::GameCleared);
        self.events.extend(progress_events);

        if cleared {
            self.finish(Outcome::Cleared);
        } else {
            self.stage = self.stage.saturating_add(1);
            self.start_stage();
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.apply(Command::ResetStage);
        self.player.clear();
        self.outcome = Some(outcome);

        let record = RunRecord::new(
            self.progress.current_date(),
            self.clock.elapsed(),
            outcome == Outcome::Cleared,
        );
        info!(
            ?outcome,
            date = %record.date_reached,
            elapsed = record.elapsed_seconds,
            "run finished"
        );
        self.events.push(Event::RunFinished { record });
    }
}

fn placement_seed(seed: u64) -> u64 {
    seed.rotate_left(32) ^ PLACEMENT_SALT
}

fn dispatch(observers: &mut [Box<dyn SessionObserver>], events: &[Event]) {
    for event in events {
        for observer in observers.iter_mut() {
            notify(observer.as_mut(), event);
        }
    }
}

fn notify(observer: &mut dyn SessionObserver, event: &Event) {
    match event {
        Event::PanelSpawned {
            panel,
            x,
            requires_double_tap,
        } => observer.on_spawn(*panel, *x, *requires_double_tap),
        Event::ObstacleSpawned { kind, x, .. } => observer.on_obstacle(*kind, *x),
        Event::PanelHit { panel, .. } => observer.on_hit(*panel),
        Event::PanelMissed { panel, cause } => observer.on_miss(*panel, *cause),
        Event::PanelRecycled { panel } => observer.on_recycle(*panel),
        Event::LivesChanged { lives } => observer.on_lives_changed(*lives),
        Event::DateAdvanced { date } => observer.on_date_changed(*date),
        Event::ProgressChanged { fraction } => observer.on_progress_changed(*fraction),
        Event::GameOver => observer.on_game_over(),
        Event::GameCleared => observer.on_cleared(),
        Event::RunFinished { record } => observer.on_run_finished(record),
        _ => {}
    }
}
