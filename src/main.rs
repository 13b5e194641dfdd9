//! Realm Stability headless runner
//!
//! Plays one autoplay session at a fixed timestep and prints the narration
//! and final result. Useful for balance tuning without a UI shell.
//!
//! Usage: realm-stability [--seed N] [--difficulty easy|normal|hard]
//!                        [--settings FILE] [--scores FILE]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use realm_stability::consts::*;
use realm_stability::highscores::now_millis;
use realm_stability::sim::{GameEvent, GameState, TickInput, tick};
use realm_stability::wallet::{OfflineWallet, WalletConnector};
use realm_stability::{Difficulty, HighScores, SessionContext, Settings};

/// Simulated display refresh (frames per second)
const FRAME_RATE: f64 = 50.0;

/// Command line options
#[derive(Parser, Debug)]
#[command(name = "realm-stability")]
#[command(about = "Play one autoplay session of Realm Stability headlessly")]
struct Options {
    /// RNG seed for the autoplay bot (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Difficulty preset applied on top of the loaded settings
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// High score file, loaded before and saved after the session
    #[arg(long)]
    scores: Option<PathBuf>,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("expected easy, normal or hard, got {s}"))
}

/// Game instance driving the simulation from "frames"
struct Game {
    accumulator: f64,
    input: TickInput,
}

impl Game {
    fn new() -> Self {
        Self {
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
        }
    }

    /// Run as many fixed ticks as the frame time allows
    fn frame(&mut self, state: &mut GameState, frame_dt: f64) {
        self.accumulator += frame_dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT as f64 && substeps < MAX_SUBSTEPS {
            tick(state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT as f64;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
    }
}

fn narrate(event: &GameEvent, clock: u32) {
    match event {
        GameEvent::ZoneChanged { to, .. } if to.is_critical() => {
            println!("[{clock:>3}s] !! Realm stability {to}");
        }
        GameEvent::ZoneChanged { to, .. } => println!("[{clock:>3}s] zone -> {to}"),
        GameEvent::ComboMilestone { count, title } => {
            println!("[{clock:>3}s] x{count} combo: {title}");
        }
        GameEvent::PowerUpUsed(applied) => println!(
            "[{clock:>3}s] {} ({:+.0}) -> {:.0} [{} left]",
            applied.kind, applied.applied, applied.value, applied.charges_left
        ),
        GameEvent::FinalWave => println!("[{clock:>3}s] FINAL WAVE"),
        _ => {}
    }
}

fn run(opts: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &opts.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(difficulty) = opts.difficulty {
        settings.apply_preset(difficulty);
    }

    let highscores = match &opts.scores {
        Some(path) => HighScores::load(path)?,
        None => HighScores::new(),
    };

    let mut wallet = OfflineWallet::new();
    wallet.connect()?;

    let mut ctx = SessionContext::new(settings, highscores, Box::new(wallet));
    if let Some(path) = &opts.scores {
        ctx = ctx.with_highscores_path(path);
    }

    let seed = opts.seed.unwrap_or_else(now_millis);
    let mut state = ctx.start_session(seed)?;
    log::info!("Game initialized with seed: {}", seed);

    let mut game = Game::new();
    while !state.is_ended() {
        game.frame(&mut state, 1.0 / FRAME_RATE);
        let clock = state.stats().elapsed as u32;
        for event in state.drain_events() {
            narrate(&event, clock);
        }
    }

    let report = ctx.teardown(&mut state);
    let stats = state.stats();
    println!();
    println!("=== Session complete (seed {seed}) ===");
    println!(
        "Swipes: {} correct / {} missed, best combo x{}",
        stats.correct_swipes, stats.incorrect_swipes, stats.best_combo
    );
    println!(
        "Battle points: {}, balanced for {:.1}s, final stability {:.1}",
        stats.battle_points, stats.time_in_balanced, report.result.final_stability
    );
    println!("Score: {}  Grade: {}", report.result.score, report.result.grade);
    if let Some(rank) = report.rank {
        println!("New high score! Rank #{rank}");
    }
    for receipt in &report.minted {
        println!("Achievement minted: {} ({})", receipt.achievement, receipt.token_id);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opts = Options::parse();

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
