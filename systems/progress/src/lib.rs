#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulated calendar that advances one month per completed stage.

use chrono::{Months, NaiveDate};
use panel_cut_core::{CalendarConfig, Event};
use tracing::info;

/// Result of advancing the calendar by one month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthAdvance {
    /// The calendar moved to the contained date, still short of the end.
    Advanced(NaiveDate),
    /// The end date was reached; the contained date equals it.
    Cleared(NaiveDate),
    /// The run was already cleared, nothing changed.
    Ignored,
}

/// Pure system tracking the calendar between the start and end dates.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    start: NaiveDate,
    end: NaiveDate,
    current: NaiveDate,
    cleared: bool,
}

impl ProgressTracker {
    /// Creates a tracker positioned at the configured start date.
    #[must_use]
    pub fn new(calendar: CalendarConfig) -> Self {
        Self {
            start: calendar.start,
            end: calendar.end,
            current: calendar.start,
            cleared: false,
        }
    }

    /// Date the calendar currently shows.
    #[must_use]
    pub fn current_date(&self) -> NaiveDate {
        self.current
    }

    /// First date of the run.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Date that clears the run.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end
    }

    /// Reports whether the end date has been reached.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Moves the calendar forward one month.
    ///
    /// Days past the end of the target month clamp to its last day. Reaching
    /// or passing the end date clamps to it and reports `Cleared` once.
    pub fn advance_month(&mut self) -> MonthAdvance {
        if self.cleared {
            return MonthAdvance::Ignored;
        }

        let next = self.current.checked_add_months(Months::new(1));
        match next {
            Some(date) if date < self.end => {
                self.current = date;
                MonthAdvance::Advanced(date)
            }
            _ => {
                self.current = self.end;
                self.cleared = true;
                MonthAdvance::Cleared(self.end)
            }
        }
    }

    /// Fraction of the calendar covered so far, clamped to `[0, 1]`.
    ///
    /// A calendar whose end does not lie after its start reports `1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let total = (self.end - self.start).num_days();
        if total <= 0 {
            return 1.0;
        }
        let covered = (self.current - self.start).num_days();
        (covered as f32 / total as f32).clamp(0.0, 1.0)
    }

    /// Returns the calendar to the start date.
    pub fn reset(&mut self) {
        self.current = self.start;
        self.cleared = false;
    }

    /// Advances on every completed stage and reports the resulting changes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            if !matches!(event, Event::StageCompleted { .. }) {
                continue;
            }

            match self.advance_month() {
                MonthAdvance::Advanced(date) => {
                    out.push(Event::DateAdvanced { date });
                    out.push(Event::ProgressChanged {
                        fraction: self.progress(),
                    });
                }
                MonthAdvance::Cleared(date) => {
                    info!(%date, "calendar reached the end date");
                    out.push(Event::DateAdvanced { date });
                    out.push(Event::ProgressChanged {
                        fraction: self.progress(),
                    });
                    out.push(Event::GameCleared);
                }
                MonthAdvance::Ignored => {}
            }
        }
    }
}
