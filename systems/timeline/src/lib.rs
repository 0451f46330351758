#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stage timeline generation and playback.
//!
//! The generator turns a stage definition into a sorted [`Timeline`]; the
//! player walks that timeline as stage time accumulates and emits the spawn
//! commands that fall due.

use std::time::Duration;

use panel_cut_core::{
    Command, IntervalRange, ObstacleSpec, Placement, ScheduledEvent, SpawnKind, Timeline,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Deterministic generator of stage timelines.
#[derive(Clone, Debug)]
pub struct TimelineGenerator {
    rng: ChaCha8Rng,
}

impl TimelineGenerator {
    /// Creates a generator whose gap stream is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Builds the timeline for one stage.
    ///
    /// Cuts and each obstacle batch run their own clock from zero, adding one
    /// sampled gap before every event. The merged list is stably sorted, so
    /// cuts precede obstacles that share a fire time.
    pub fn generate(
        &mut self,
        cut_count: u32,
        obstacles: &[ObstacleSpec],
        interval: IntervalRange,
    ) -> Timeline {
        let mut events = Vec::new();
        self.schedule_batch(
            cut_count,
            SpawnKind::Cut,
            Placement::Random,
            interval,
            &mut events,
        );
        for spec in obstacles {
            self.schedule_batch(
                spec.count,
                SpawnKind::Obstacle(spec.kind),
                spec.placement,
                interval,
                &mut events,
            );
        }

        let timeline = Timeline::from_unsorted(events);
        debug!(
            events = timeline.len(),
            cuts = timeline.cut_count(),
            "timeline generated"
        );
        timeline
    }

    fn schedule_batch(
        &mut self,
        count: u32,
        kind: SpawnKind,
        placement: Placement,
        interval: IntervalRange,
        out: &mut Vec<ScheduledEvent>,
    ) {
        let mut clock = Duration::ZERO;
        for _ in 0..count {
            clock = clock.saturating_add(self.sample_gap(interval));
            out.push(ScheduledEvent::new(clock, kind, placement));
        }
    }

    fn sample_gap(&mut self, interval: IntervalRange) -> Duration {
        let (min, max) = (interval.min_secs(), interval.max_secs());
        let secs = if min < max {
            self.rng.gen_range(min..=max)
        } else {
            min
        };
        Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO)
    }
}

/// Plays a timeline back against accumulated stage time.
#[derive(Clone, Debug)]
pub struct TimelinePlayer {
    timeline: Timeline,
    cursor: usize,
    elapsed: Duration,
    span: (f32, f32),
    rng: ChaCha8Rng,
}

impl TimelinePlayer {
    /// Creates an idle player.
    ///
    /// `span` is the horizontal range randomly placed spawns are drawn from;
    /// `seed` fixes the placement stream.
    #[must_use]
    pub fn new(seed: u64, span: (f32, f32)) -> Self {
        Self {
            timeline: Timeline::empty(),
            cursor: 0,
            elapsed: Duration::ZERO,
            span,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Replaces the schedule and restarts stage time at zero.
    pub fn load(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.cursor = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Drops whatever is left of the schedule.
    pub fn clear(&mut self) {
        self.load(Timeline::empty());
    }

    /// Advances stage time and emits a spawn command for every event now due.
    ///
    /// Each event is emitted once, in timeline order, no matter how many
    /// events a single large `dt` makes due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        self.elapsed = self.elapsed.saturating_add(dt);

        while let Some(event) = self.timeline.events().get(self.cursor).copied() {
            if event.fire_time() > self.elapsed {
                break;
            }
            self.cursor += 1;

            let x = self.place(event.placement());
            out.push(match event.kind() {
                SpawnKind::Cut => Command::SpawnPanel { x },
                SpawnKind::Obstacle(kind) => Command::SpawnObstacle {
                    kind,
                    placement: event.placement(),
                    x,
                },
            });
        }
    }

    /// Reports whether every scheduled event has been emitted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.timeline.len()
    }

    /// Number of scheduled events not yet emitted.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.timeline.len().saturating_sub(self.cursor)
    }

    /// Stage time accumulated since the last load.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn place(&mut self, placement: Placement) -> f32 {
        match placement {
            Placement::Fixed => 0.0,
            Placement::Random => {
                let (min, max) = self.span;
                if min < max {
                    self.rng.gen_range(min..=max)
                } else {
                    min
                }
            }
        }
    }
}
