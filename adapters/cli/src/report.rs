use chrono::NaiveDate;
use panel_cut_core::{MissCause, ObstacleKind, PanelId, RunRecord, SessionObserver};
use tracing::{debug, info, warn};

/// Observer that narrates a headless run through `tracing`.
#[derive(Debug, Default)]
pub(crate) struct LogReporter;

impl SessionObserver for LogReporter {
    fn on_obstacle(&mut self, kind: ObstacleKind, x: f32) {
        debug!(?kind, x, "obstacle appeared");
    }

    fn on_miss(&mut self, panel: PanelId, cause: MissCause) {
        debug!(panel = panel.get(), ?cause, "panel missed");
    }

    fn on_lives_changed(&mut self, lives: u32) {
        info!(lives, "lives changed");
    }

    fn on_date_changed(&mut self, date: NaiveDate) {
        info!(%date, "month completed");
    }

    fn on_progress_changed(&mut self, fraction: f32) {
        debug!(progress = fraction, "progress changed");
    }

    fn on_game_over(&mut self) {
        warn!("game over");
    }

    fn on_cleared(&mut self) {
        info!("calendar cleared");
    }

    fn on_run_finished(&mut self, record: &RunRecord) {
        info!(
            date = %record.date_reached,
            elapsed = record.elapsed_seconds,
            cleared = record.cleared,
            "run finished"
        );
    }
}
