//! Highway Escape entry point
//!
//! Headless native host: drives the race with the built-in autopilot, feeds
//! crash results to the leaderboard and logs what happened. A rendering host
//! would drain the same events each frame.
//!
//! Usage: `highway-escape [runs] [easy|normal|hard]`

use highway_escape::consts::*;
use highway_escape::persistence::JsonStore;
use highway_escape::sim::{GameEvent, RaceMode, RaceState, TickInput, tick};
use highway_escape::{Difficulty, HighScores, Settings, unix_millis};

/// Runs to play when no count is given on the command line
const DEFAULT_RUNS: u32 = 3;
/// Give up on a run after this many ticks (10 minutes of game time)
const MAX_RUN_TICKS: u64 = 10 * 60 * SIM_HZ as u64;

fn main() {
    env_logger::init();
    log::info!("Highway Escape (headless) starting...");

    let runs = match std::env::args().nth(1) {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid run count {:?}", arg);
            DEFAULT_RUNS
        }),
        None => DEFAULT_RUNS,
    };

    let store = JsonStore::new(JsonStore::default_dir());
    let mut settings = Settings::load(&store);
    if let Some(arg) = std::env::args().nth(2) {
        match Difficulty::from_str(&arg) {
            Some(difficulty) => settings.difficulty = difficulty,
            None => log::warn!("Unknown difficulty {:?}, keeping {}", arg, settings.difficulty.as_str()),
        }
    }
    let mut high_scores = HighScores::load(&store);

    let seed = settings.seed.unwrap_or_else(|| unix_millis() as u64);
    log::info!(
        "Difficulty {}, seed {}, {} run(s)",
        settings.difficulty.as_str(),
        seed,
        runs
    );

    let mut state = RaceState::with_geometry(seed, settings.tuning(), settings.geometry());
    let mut completed = 0;

    let mut input = TickInput {
        start: true,
        autopilot: true,
        ..Default::default()
    };

    while completed < runs && !state.quit_requested {
        tick(&mut state, &input, SIM_DT);
        input.start = false;
        input.restart = false;

        for event in state.drain_events() {
            match event {
                GameEvent::Crashed { .. } => {
                    high_scores.record(&event, unix_millis());
                    completed += 1;
                    input.restart = completed < runs;
                }
                GameEvent::CountdownBeat { remaining } => log::debug!("Countdown: {}", remaining),
                GameEvent::EmpoweredStarted => log::info!("Empowered!"),
                GameEvent::NearMiss { id } => log::debug!("Near miss with #{}", id),
                _ => {}
            }
        }

        if state.mode == RaceMode::Racing && state.race_ticks >= MAX_RUN_TICKS {
            log::info!(
                "Run survived {} ticks (score {}), ending it",
                state.race_ticks,
                state.score
            );
            completed += 1;
            if completed < runs {
                state.reset_run();
            }
        }
    }

    high_scores.save(&store);

    println!("Highway Escape leaderboard:");
    if high_scores.is_empty() {
        println!("  (no scores yet)");
    }
    for (i, entry) in high_scores.entries.iter().enumerate() {
        println!(
            "  {:>2}. {:>8}  {:>8.0} m",
            i + 1,
            entry.score,
            entry.distance
        );
    }
}
