#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Panel Cut headlessly.

mod autoplay;
mod config;
mod records;
mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use panel_cut_core::{Event, RunRecord};
use panel_cut_session::{Session, SessionState};
use panel_cut_world::query;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{autoplay::Autoplayer, report::LogReporter};

const DEFAULT_RECORDS: &str = "panel-cut-records.json";

#[derive(Debug, Parser)]
#[command(name = "panel-cut")]
#[command(about = "Headless runner for the Panel Cut rhythm game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plays one run with a scripted player and records the result.
    Play(PlayArgs),
    /// Prints or clears the saved leaderboard.
    Records {
        #[arg(long, default_value = DEFAULT_RECORDS)]
        records: PathBuf,
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Stage table to load.
    #[arg(long, default_value = "assets/stages.toml")]
    config: PathBuf,
    /// Overrides the seed from the stage table.
    #[arg(long)]
    seed: Option<u64>,
    /// Probability that the scripted player taps a panel in time.
    #[arg(long, default_value_t = 0.95)]
    accuracy: f64,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Play time after which the run is abandoned.
    #[arg(long, default_value_t = 120)]
    max_minutes: u64,
    /// Leaderboard file updated with the run's record.
    #[arg(long, default_value = DEFAULT_RECORDS)]
    records: PathBuf,
}

/// Entry point for the Panel Cut command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => cmd_play(&args),
        Commands::Records { records, clear } => cmd_records(&records, clear),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn cmd_play(args: &PlayArgs) -> Result<()> {
    if args.frame_ms == 0 {
        bail!("frame length must be at least one millisecond");
    }

    let mut config = config::load_session_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let mut session = Session::new(config).context("failed to start session")?;
    session.subscribe(Box::new(LogReporter));
    println!("{}", query::welcome_banner(session.world()));

    let mut player = Autoplayer::new(seed, args.accuracy);
    let frame = Duration::from_millis(args.frame_ms);
    let limit = Duration::from_secs(args.max_minutes.saturating_mul(60));
    let mut tally = Tally::default();

    while session.play_time() < limit {
        if matches!(
            session.state(),
            SessionState::GameOver | SessionState::Cleared
        ) {
            break;
        }
        let taps = player.taps(&session);
        let events = session.tick(frame, &taps);
        tally.record(events);
        player.observe(events);
    }

    let Some(record) = tally.finished else {
        bail!(
            "run did not finish within {} minutes of play time",
            args.max_minutes
        );
    };

    println!(
        "{} on {} after {:.2}s ({} hit, {} missed, {} stages)",
        if record.cleared { "cleared" } else { "game over" },
        record.date_reached,
        record.elapsed_seconds,
        tally.hits,
        tally.misses,
        tally.stages,
    );

    let mut board = records::load_leaderboard(&args.records)?;
    match board.submit(record) {
        Some(rank) => println!("new leaderboard entry at #{}", rank + 1),
        None => println!("run did not make the leaderboard"),
    }
    records::save_leaderboard(&args.records, &board)
}

fn cmd_records(path: &std::path::Path, clear: bool) -> Result<()> {
    let mut board = records::load_leaderboard(path)?;
    if clear {
        board.clear();
        return records::save_leaderboard(path, &board);
    }

    if board.records().is_empty() {
        println!("no runs recorded yet");
    }
    for (index, record) in board.records().iter().enumerate() {
        println!(
            "#{} {} {:.2}s{}",
            index + 1,
            record.date_reached,
            record.elapsed_seconds,
            if record.cleared { " (cleared)" } else { "" }
        );
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Tally {
    hits: u32,
    misses: u32,
    stages: u32,
    finished: Option<RunRecord>,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PanelHit { .. } => self.hits += 1,
                Event::PanelMissed { .. } => self.misses += 1,
                Event::StageCompleted { .. } => self.stages += 1,
                Event::RunFinished { record } => self.finished = Some(record.clone()),
                _ => {}
            }
        }
    }
}
