//! Per-panel judgment against the cut line.
//!
//! Two entry points drive the state machine. [`advance_panels`] runs once per
//! tick and handles movement, line crossing and leaving the screen.
//! [`resolve_tap`] runs once per input and resolves at most one panel, the
//! waiting panel whose top edge is nearest to the line.

use std::time::Duration;

use panel_cut_core::{
    Event, FieldConfig, JudgmentError, MissCause, PanelId, Resolution, TapInput,
};
use tracing::debug;

use crate::pool::{Panel, PanelPool};

/// Outcome of a single tap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TapOutcome {
    Armed(PanelId),
    Hit { panel: PanelId, offset: f32 },
    Missed(PanelId),
    Discarded(JudgmentError),
}

impl TapOutcome {
    pub(crate) fn into_event(self) -> Event {
        match self {
            Self::Armed(panel) => Event::TapArmed { panel },
            Self::Hit { panel, offset } => Event::PanelHit { panel, offset },
            Self::Missed(panel) => Event::PanelMissed {
                panel,
                cause: MissCause::OutOfRange,
            },
            Self::Discarded(reason) => Event::TapDiscarded { reason },
        }
    }
}

/// Moves every active panel and applies the line and screen bounds.
pub(crate) fn advance_panels(
    pool: &mut PanelPool,
    field: &FieldConfig,
    threshold: Option<f32>,
    speed_multiplier: f32,
    dt: Duration,
    out_events: &mut Vec<Event>,
) {
    let travel = field.base_speed * speed_multiplier * dt.as_secs_f32();
    let half_height = field.half_height();
    let pass_line = threshold.map(|line| line + field.success_distance());
    let offscreen_y = field.offscreen_y();

    let mut exited = Vec::new();
    for panel in pool.active_mut() {
        panel.position_y += travel;

        if let Some(pass_line) = pass_line {
            if panel.is_waiting() && panel.top_edge(half_height) > pass_line {
                panel.resolve(Resolution::PassedWithoutTouch);
                debug!(panel = panel.id.get(), "panel passed the line untouched");
                out_events.push(Event::PanelMissed {
                    panel: panel.id,
                    cause: MissCause::PassedLine,
                });
            }
        }

        if panel.position_y > offscreen_y {
            if panel.is_waiting() {
                panel.resolve(Resolution::PassedWithoutTouch);
                out_events.push(Event::PanelMissed {
                    panel: panel.id,
                    cause: MissCause::LeftScreen,
                });
            }
            exited.push(panel.id);
        }
    }

    for panel in exited {
        if pool.release(panel) {
            out_events.push(Event::PanelRecycled { panel });
        }
    }
}

/// Resolves a tap against the waiting panel nearest to the line.
pub(crate) fn resolve_tap(
    pool: &mut PanelPool,
    field: &FieldConfig,
    threshold: Option<f32>,
    input: &TapInput,
) -> TapOutcome {
    let Some(line) = threshold else {
        return TapOutcome::Discarded(JudgmentError::ThresholdUnavailable);
    };

    let half_height = field.half_height();
    let Some(target) = nearest_waiting(pool.active(), line, half_height) else {
        return TapOutcome::Discarded(JudgmentError::NoEligibleTarget);
    };
    let Some(panel) = pool.slot_mut(target) else {
        return TapOutcome::Discarded(JudgmentError::NoEligibleTarget);
    };

    if panel.requires_double_tap {
        let window = field.double_tap_window();
        let confirmed = panel
            .armed_at
            .is_some_and(|first| input.timestamp.saturating_sub(first) < window);
        if !confirmed {
            panel.armed_at = Some(input.timestamp);
            debug!(panel = target.get(), "taped panel armed");
            return TapOutcome::Armed(target);
        }
    }

    let offset = (panel.top_edge(half_height) - line).abs();
    if offset <= field.success_distance() {
        panel.resolve(Resolution::Hit);
        debug!(panel = target.get(), offset, "panel cut on the line");
        TapOutcome::Hit {
            panel: target,
            offset,
        }
    } else {
        panel.resolve(Resolution::Missed);
        debug!(panel = target.get(), offset, "panel cut out of range");
        TapOutcome::Missed(target)
    }
}

/// Selects the waiting panel with the smallest distance to the line.
///
/// Panels are visited in id order and only a strictly smaller distance
/// replaces the current pick, so ties go to the lowest id.
fn nearest_waiting<'a>(
    panels: impl Iterator<Item = &'a Panel>,
    line: f32,
    half_height: f32,
) -> Option<PanelId> {
    let mut best: Option<(PanelId, f32)> = None;
    for panel in panels.filter(|panel| panel.is_waiting()) {
        let distance = (panel.top_edge(half_height) - line).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((panel.id, distance)),
        }
    }
    best.map(|(id, _)| id)
}
