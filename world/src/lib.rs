#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative panel state management for Panel Cut.
//!
//! The world owns the panel pool, the cut line and the speed multiplier. It is
//! mutated exclusively through [`apply`], which executes a single [`Command`]
//! and appends the resulting [`Event`] values in a deterministic order.

mod judgment;
pub mod pool;

use panel_cut_core::{Command, Event, FieldConfig, ObstacleKind, WELCOME_BANNER};
use tracing::{info, warn};

use crate::pool::PanelPool;

/// Represents the authoritative Panel Cut world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    field: FieldConfig,
    pool: PanelPool,
    threshold_y: Option<f32>,
    speed_multiplier: f32,
    pending_tape: bool,
    tick_index: u64,
}

impl World {
    /// Creates a new world using the default field configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_field(FieldConfig::default())
    }

    /// Creates a new world for the provided field configuration.
    #[must_use]
    pub fn with_field(field: FieldConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            pool: PanelPool::new(field.pool_capacity),
            threshold_y: field.threshold_y,
            speed_multiplier: 1.0,
            pending_tape: false,
            tick_index: 0,
            field,
        }
    }

    fn recycle_all(&mut self, out_events: &mut Vec<Event>) {
        for panel in self.pool.release_all() {
            out_events.push(Event::PanelRecycled { panel });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureField { field } => {
            world.recycle_all(out_events);
            world.pool = PanelPool::new(field.pool_capacity);
            world.threshold_y = field.threshold_y;
            world.pending_tape = false;
            world.field = field;
            out_events.push(Event::FieldConfigured {
                capacity: world.pool.capacity(),
            });
            out_events.push(Event::ThresholdChanged {
                y: world.threshold_y,
            });
        }
        Command::SetThreshold { y } => {
            world.threshold_y = y;
            out_events.push(Event::ThresholdChanged { y });
        }
        Command::SetSpeedMultiplier { multiplier } => {
            if multiplier.is_finite() && multiplier >= 0.0 {
                world.speed_multiplier = multiplier;
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            judgment::advance_panels(
                &mut world.pool,
                &world.field,
                world.threshold_y,
                world.speed_multiplier,
                dt,
                out_events,
            );
        }
        Command::SpawnPanel { x } => match world.pool.acquire() {
            Ok(panel) => {
                let requires_double_tap = world.pending_tape;
                world.pending_tape = false;
                let spawn_y = world.field.spawn_y;
                if let Some(slot) = world.pool.slot_mut(panel) {
                    slot.launch(spawn_y, x, requires_double_tap);
                }
                out_events.push(Event::PanelSpawned {
                    panel,
                    x,
                    requires_double_tap,
                });
            }
            Err(reason) => {
                warn!(
                    capacity = world.pool.capacity(),
                    "{reason}; dropping panel spawn"
                );
                out_events.push(Event::SpawnDropped { reason });
            }
        },
        Command::SpawnObstacle { kind, placement, x } => {
            if kind == ObstacleKind::CutLineTape {
                world.pending_tape = true;
            }
            out_events.push(Event::ObstacleSpawned { kind, placement, x });
        }
        Command::Tap { input } => {
            let outcome =
                judgment::resolve_tap(&mut world.pool, &world.field, world.threshold_y, &input);
            out_events.push(outcome.into_event());
        }
        Command::ReleasePressure => out_events.push(Event::PressureReleased),
        Command::ResetStage => {
            world.recycle_all(out_events);
            world.pending_tape = false;
            info!(tick = world.tick_index, "stage reset");
            out_events.push(Event::StageReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use panel_cut_core::{FieldConfig, PanelId, PanelSnapshot, PanelView};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the field configuration.
    #[must_use]
    pub fn field(world: &World) -> &FieldConfig {
        &world.field
    }

    /// Current cut line position, `None` while judgment is unavailable.
    #[must_use]
    pub fn threshold(world: &World) -> Option<f32> {
        world.threshold_y
    }

    /// Speed multiplier currently applied to panel movement.
    #[must_use]
    pub fn speed_multiplier(world: &World) -> f32 {
        world.speed_multiplier
    }

    /// Reports whether the next spawned panel will need a double tap.
    #[must_use]
    pub fn tape_pending(world: &World) -> bool {
        world.pending_tape
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the active panels.
    #[must_use]
    pub fn panel_view(world: &World) -> PanelView {
        PanelView::from_snapshots(world.pool.snapshots(world.field.half_height()))
    }

    /// Captures a single active panel.
    #[must_use]
    pub fn panel(world: &World, id: PanelId) -> Option<PanelSnapshot> {
        world.pool.snapshot(id, world.field.half_height())
    }

    /// Number of panels currently handed out by the pool.
    #[must_use]
    pub fn active_panel_count(world: &World) -> usize {
        world.pool.active_count()
    }

    /// Number of pool slots waiting to be reused.
    #[must_use]
    pub fn free_panel_count(world: &World) -> usize {
        world.pool.free_count()
    }

    /// Total number of pool slots.
    #[must_use]
    pub fn pool_capacity(world: &World) -> usize {
        world.pool.capacity()
    }
}
