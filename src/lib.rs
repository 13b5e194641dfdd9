//! Realm Stability - simulation core of a balance-keeping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (stability, zones, combos, power-ups, scoring)
//! - `settings`: Data-driven session configuration and difficulty presets
//! - `highscores`: Leaderboard of final session results
//! - `wallet`: Achievement minting capability (swappable connectors)
//! - `context`: Explicit owner of everything that outlives a single session

pub mod context;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod wallet;

pub use context::{SessionContext, SessionReport};
pub use highscores::HighScores;
pub use settings::{ConfigError, Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Stability bounds
    pub const STABILITY_MIN: f32 = 0.0;
    pub const STABILITY_MAX: f32 = 100.0;
    /// Stability at session start
    pub const STABILITY_SEED: f32 = 50.0;

    /// Upper bound on charges for any power-up
    pub const MAX_CHARGES: u8 = 3;

    /// Session length in seconds
    pub const SESSION_SECS: f32 = 90.0;
    /// Remaining time at which the final wave begins
    pub const FINAL_WAVE_SECS: f32 = 15.0;

    /// Battle points for a correct swipe before the combo multiplier
    pub const POINTS_PER_SWIPE: u32 = 10;
}

/// Clamp a stability value into the legal range.
#[inline]
pub fn clamp_stability(value: f32) -> f32 {
    value.clamp(consts::STABILITY_MIN, consts::STABILITY_MAX)
}

/// Move `current` toward `target` by at most `step`, never overshooting.
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step.copysign(delta)
    }
}
