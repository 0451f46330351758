use std::time::Duration;

use panel_cut_core::{
    Command, Event, FieldConfig, JudgmentError, MissCause, ObstacleKind, PanelId, PanelState,
    Placement, Resolution, SpawnError, TapInput,
};
use panel_cut_world::{self as world, query, World};

fn field() -> FieldConfig {
    FieldConfig {
        screen_height: 1000.0,
        panel_height: 200.0,
        spawn_y: 0.0,
        offscreen_margin: 100.0,
        threshold_y: Some(100.0),
        base_speed: 100.0,
        success_range: 0.5,
        double_tap_window_secs: 0.3,
        pool_capacity: 3,
        ..FieldConfig::default()
    }
}

fn configured_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureField { field: field() }, &mut events);
    world
}

fn tap(world: &mut World, secs: f32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tap {
            input: TapInput::new(0.0, 0.0, Duration::from_secs_f32(secs)),
        },
        &mut events,
    );
    events
}

fn spawn(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnPanel { x: 0.0 }, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

#[test]
fn tap_on_panel_at_the_line_is_a_hit() {
    let mut world = configured_world();
    let spawned = spawn(&mut world);
    assert_eq!(
        spawned,
        vec![Event::PanelSpawned {
            panel: PanelId::new(0),
            x: 0.0,
            requires_double_tap: false,
        }]
    );

    let snapshot = query::panel(&world, PanelId::new(0)).expect("panel is active");
    assert!((snapshot.top_edge_y - 100.0).abs() < f32::EPSILON);

    let events = tap(&mut world, 0.0);
    assert_eq!(
        events,
        vec![Event::PanelHit {
            panel: PanelId::new(0),
            offset: 0.0,
        }]
    );

    let snapshot = query::panel(&world, PanelId::new(0)).expect("resolved panel stays active");
    assert_eq!(snapshot.state, PanelState::Resolved(Resolution::Hit));
    assert!(!snapshot.line_visible, "line indicator hides after judgment");
}

#[test]
fn untouched_panel_passing_the_line_misses_exactly_once() {
    let mut world = configured_world();
    let _ = spawn(&mut world);

    let mut misses = Vec::new();
    for _ in 0..8 {
        let events = tick(&mut world, 100);
        misses.extend(
            events
                .into_iter()
                .filter(|event| matches!(event, Event::PanelMissed { .. })),
        );
    }

    assert_eq!(
        misses,
        vec![Event::PanelMissed {
            panel: PanelId::new(0),
            cause: MissCause::PassedLine,
        }]
    );
    let snapshot = query::panel(&world, PanelId::new(0)).expect("panel still on screen");
    assert_eq!(
        snapshot.state,
        PanelState::Resolved(Resolution::PassedWithoutTouch)
    );
}

#[test]
fn single_tap_resolves_only_the_nearest_panel() {
    let mut world = configured_world();
    let _ = spawn(&mut world);
    let _ = tick(&mut world, 300);
    let _ = spawn(&mut world);

    let events = tap(&mut world, 0.5);
    assert_eq!(
        events,
        vec![Event::PanelHit {
            panel: PanelId::new(1),
            offset: 0.0,
        }]
    );

    let untouched = query::panel(&world, PanelId::new(0)).expect("first panel active");
    assert_eq!(untouched.state, PanelState::Waiting);
}

#[test]
fn tap_without_waiting_panels_is_discarded() {
    let mut world = configured_world();
    assert_eq!(
        tap(&mut world, 0.0),
        vec![Event::TapDiscarded {
            reason: JudgmentError::NoEligibleTarget,
        }]
    );

    let mut events = Vec::new();
    world::apply(&mut world, Command::SetThreshold { y: None }, &mut events);
    let _ = spawn(&mut world);
    assert_eq!(
        tap(&mut world, 0.0),
        vec![Event::TapDiscarded {
            reason: JudgmentError::ThresholdUnavailable,
        }]
    );
}

#[test]
fn tape_obstacle_marks_next_panel_for_double_tap() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            kind: ObstacleKind::CutLineTape,
            placement: Placement::Fixed,
            x: 0.0,
        },
        &mut events,
    );
    assert!(query::tape_pending(&world));

    let spawned = spawn(&mut world);
    assert!(matches!(
        spawned[0],
        Event::PanelSpawned {
            requires_double_tap: true,
            ..
        }
    ));
    assert!(!query::tape_pending(&world), "tape applies to one panel");

    assert_eq!(
        tap(&mut world, 1.0),
        vec![Event::TapArmed {
            panel: PanelId::new(0)
        }]
    );
    assert_eq!(
        tap(&mut world, 2.0),
        vec![Event::TapArmed {
            panel: PanelId::new(0)
        }],
        "isolated taps never resolve a taped panel"
    );
    assert!(matches!(tap(&mut world, 2.1)[0], Event::PanelHit { .. }));
}

#[test]
fn unrepresentable_double_tap_window_never_resolves_a_taped_panel() {
    let mut world = World::new();
    let mut events = Vec::new();
    let field = FieldConfig {
        double_tap_window_secs: 1e20,
        ..field()
    };
    world::apply(&mut world, Command::ConfigureField { field }, &mut events);
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            kind: ObstacleKind::CutLineTape,
            placement: Placement::Fixed,
            x: 0.0,
        },
        &mut events,
    );
    let _ = spawn(&mut world);

    let armed = vec![Event::TapArmed {
        panel: PanelId::new(0),
    }];
    assert_eq!(tap(&mut world, 1.0), armed);
    assert_eq!(tap(&mut world, 1.1), armed);
}

#[test]
fn exhausted_pool_drops_spawns_and_conserves_slots() {
    let mut world = configured_world();
    for _ in 0..3 {
        let _ = spawn(&mut world);
    }

    assert_eq!(
        spawn(&mut world),
        vec![Event::SpawnDropped {
            reason: SpawnError::PoolExhausted,
        }]
    );
    assert_eq!(query::active_panel_count(&world), 3);
    assert_eq!(
        query::active_panel_count(&world) + query::free_panel_count(&world),
        query::pool_capacity(&world)
    );
}

#[test]
fn panels_leaving_the_screen_return_to_the_pool() {
    let mut world = configured_world();
    let _ = spawn(&mut world);

    let mut recycled = 0;
    for _ in 0..20 {
        recycled += tick(&mut world, 1000)
            .iter()
            .filter(|event| matches!(event, Event::PanelRecycled { .. }))
            .count();
    }

    assert_eq!(recycled, 1);
    assert_eq!(query::active_panel_count(&world), 0);
    assert_eq!(query::free_panel_count(&world), 3);
}

#[test]
fn reset_stage_releases_every_panel() {
    let mut world = configured_world();
    let _ = spawn(&mut world);
    let _ = spawn(&mut world);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetStage, &mut events);
    assert_eq!(
        events,
        vec![
            Event::PanelRecycled {
                panel: PanelId::new(0)
            },
            Event::PanelRecycled {
                panel: PanelId::new(1)
            },
            Event::StageReset,
        ]
    );
    assert!(query::panel_view(&world).is_empty());
}

#[test]
fn speed_multiplier_scales_movement() {
    let mut world = configured_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetSpeedMultiplier { multiplier: 2.0 },
        &mut events,
    );
    let _ = spawn(&mut world);
    let _ = tick(&mut world, 250);

    let snapshot = query::panel(&world, PanelId::new(0)).expect("panel active");
    assert!((snapshot.position_y - 50.0).abs() < 1e-3);
    assert!((query::speed_multiplier(&world) - 2.0).abs() < f32::EPSILON);
}
