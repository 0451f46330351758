use chrono::NaiveDate;
use panel_cut_core::{CalendarConfig, Event};
use panel_cut_system_progress::{MonthAdvance, ProgressTracker};

fn stage_completed(stage: u32) -> Event {
    Event::StageCompleted { stage }
}

#[test]
fn default_calendar_clears_after_every_month_is_played() {
    let calendar = CalendarConfig::default();
    let mut tracker = ProgressTracker::new(calendar);
    assert_eq!(
        tracker.start_date(),
        NaiveDate::from_ymd_opt(2006, 9, 8).expect("start")
    );

    let mut previous = tracker.progress();
    let mut stages = 0;
    loop {
        stages += 1;
        let outcome = tracker.advance_month();
        let current = tracker.progress();
        assert!(current >= previous, "progress never decreases");
        previous = current;
        if matches!(outcome, MonthAdvance::Cleared(_)) {
            break;
        }
        assert!(current < 1.0);
    }

    assert_eq!(stages, 167);
    assert_eq!(tracker.current_date(), tracker.end_date());
    assert_eq!(tracker.progress(), 1.0);
}

#[test]
fn handle_reports_date_progress_and_clear() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 15).expect("start");
    let end = NaiveDate::from_ymd_opt(2020, 3, 1).expect("end");
    let mut tracker = ProgressTracker::new(CalendarConfig { start, end });

    let mut out = Vec::new();
    tracker.handle(&[stage_completed(0)], &mut out);
    assert_eq!(
        out,
        vec![
            Event::DateAdvanced {
                date: NaiveDate::from_ymd_opt(2020, 2, 15).expect("date"),
            },
            Event::ProgressChanged {
                fraction: 31.0 / 46.0,
            },
        ]
    );

    out.clear();
    tracker.handle(&[stage_completed(1), stage_completed(2)], &mut out);
    assert_eq!(
        out,
        vec![
            Event::DateAdvanced { date: end },
            Event::ProgressChanged { fraction: 1.0 },
            Event::GameCleared,
        ],
        "a second completion after clearing is ignored"
    );
}

#[test]
fn unrelated_events_do_not_move_the_calendar() {
    let mut tracker = ProgressTracker::new(CalendarConfig::default());
    let mut out = Vec::new();
    tracker.handle(&[Event::GameOver, Event::StageReset], &mut out);
    assert!(out.is_empty());
    assert_eq!(tracker.progress(), 0.0);
}
