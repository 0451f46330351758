use std::collections::HashSet;

use panel_cut_core::{Event, PanelId, PanelState, TapInput};
use panel_cut_session::Session;
use panel_cut_world::query;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Share of the success distance in which the scripted player reacts.
const REACTION_ZONE: f32 = 0.5;

/// Scripted player that taps panels near the line with a fixed accuracy.
///
/// Each panel is judged once as it enters the reaction zone: with probability
/// `accuracy` it is tapped (twice when taped), otherwise it is left to pass
/// the line.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    rng: ChaCha8Rng,
    accuracy: f64,
    decided: HashSet<PanelId>,
}

impl Autoplayer {
    pub(crate) fn new(seed: u64, accuracy: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            decided: HashSet::new(),
        }
    }

    /// Taps to submit with the next frame.
    pub(crate) fn taps(&mut self, session: &Session) -> Vec<TapInput> {
        let world = session.world();
        let Some(line) = query::threshold(world) else {
            return Vec::new();
        };
        let zone = query::field(world).success_distance() * REACTION_ZONE;
        let now = session.play_time();

        let mut taps = Vec::new();
        for panel in query::panel_view(world).iter() {
            if panel.state != PanelState::Waiting || (panel.top_edge_y - line).abs() > zone {
                continue;
            }
            if !self.decided.insert(panel.id) {
                continue;
            }
            if !self.rng.gen_bool(self.accuracy) {
                continue;
            }

            taps.push(TapInput::new(panel.x, line, now));
            if panel.requires_double_tap {
                taps.push(TapInput::new(panel.x, line, now));
            }
        }
        taps
    }

    /// Forgets panels that returned to the pool so their slots can be reused.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Event::PanelRecycled { panel } = event {
                let _ = self.decided.remove(panel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use panel_cut_core::{CalendarConfig, SessionConfig, StageDefinition};
    use panel_cut_session::SessionState;

    use super::*;

    fn run(accuracy: f64) -> Session {
        let start = CalendarConfig::default().start;
        let config = SessionConfig {
            calendar: CalendarConfig { start, end: start },
            stages: vec![StageDefinition::cuts(3)],
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).expect("valid config");
        let mut player = Autoplayer::new(3, accuracy);

        for _ in 0..20_000 {
            if matches!(
                session.state(),
                SessionState::GameOver | SessionState::Cleared
            ) {
                break;
            }
            let taps = player.taps(&session);
            let events = session.tick(Duration::from_millis(16), &taps);
            player.observe(events);
        }
        session
    }

    #[test]
    fn perfect_accuracy_clears_a_single_stage_calendar() {
        let session = run(1.0);
        assert_eq!(session.state(), SessionState::Cleared);
        assert_eq!(session.lives(), 3);
    }

    #[test]
    fn zero_accuracy_loses_every_life() {
        let session = run(0.0);
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.lives(), 0);
    }
}
