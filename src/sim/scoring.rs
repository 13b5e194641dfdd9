//! Session statistics and final scoring
//!
//! Score formula:
//!
//! ```text
//! accuracy       = correct / (correct + incorrect)   (0 with no swipes)
//! stabilityBonus = 1.2 if 40 <= finalStability <= 60 else 0.8
//! timeBonus      = 1 + (timeInBalanced / 60) * 0.5
//! accuracyBonus  = 1 + accuracy * 0.3
//! score          = floor(battlePoints * stabilityBonus * timeBonus * accuracyBonus)
//! ```
//!
//! Grades are checked from S downward and need both the score and the
//! accuracy floor, so a big score with poor accuracy can still land on D.

use serde::{Deserialize, Serialize};

/// Stability window that earns the closing bonus
const BONUS_BAND: (f32, f32) = (40.0, 60.0);
/// Absorbs binary rounding of the decimal bonus factors before flooring
const SCORE_EPSILON: f64 = 1e-9;

/// Running statistics for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub battle_points: u64,
    /// Seconds spent in the balanced zone
    pub time_in_balanced: f32,
    pub correct_swipes: u32,
    pub incorrect_swipes: u32,
    /// Whole seconds left on the session timer
    pub timer_remaining: u32,
    #[serde(default)]
    pub power_ups_used: u32,
    #[serde(default)]
    pub best_combo: u32,
    /// Seconds of simulated play
    #[serde(default)]
    pub elapsed: f32,
}

impl SessionStats {
    /// Share of swipes that were correct (0 when nothing was swiped)
    pub fn accuracy(&self) -> f64 {
        let total = self.correct_swipes as u64 + self.incorrect_swipes as u64;
        if total == 0 {
            0.0
        } else {
            self.correct_swipes as f64 / total as f64
        }
    }
}

/// Letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// (grade, minimum score, minimum accuracy), best first
    const LADDER: [(Grade, u64, f64); 4] = [
        (Grade::S, 500, 0.90),
        (Grade::A, 400, 0.80),
        (Grade::B, 300, 0.70),
        (Grade::C, 200, 0.60),
    ];

    /// First rung whose score and accuracy floors are both met
    pub fn from_score(score: u64, accuracy: f64) -> Self {
        Self::LADDER
            .iter()
            .find(|(_, min_score, min_acc)| score >= *min_score && accuracy >= *min_acc)
            .map(|(grade, _, _)| *grade)
            .unwrap_or(Grade::D)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a session. Computed once, never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub score: u64,
    pub grade: Grade,
    pub accuracy: f64,
    pub final_stability: f32,
    pub battle_points: u64,
    pub best_combo: u32,
    pub time_in_balanced: f32,
}

/// Bonus for finishing inside the stability window
pub fn stability_bonus(final_stability: f32) -> f64 {
    if final_stability >= BONUS_BAND.0 && final_stability <= BONUS_BAND.1 {
        1.2
    } else {
        0.8
    }
}

/// Bonus for time spent balanced
pub fn time_bonus(time_in_balanced: f32) -> f64 {
    1.0 + (time_in_balanced as f64 / 60.0) * 0.5
}

/// Bonus for swipe accuracy
pub fn accuracy_bonus(accuracy: f64) -> f64 {
    1.0 + accuracy * 0.3
}

/// Compute the final score and grade
pub fn finalize(stats: &SessionStats, final_stability: f32) -> SessionResult {
    let accuracy = stats.accuracy();
    let raw = stats.battle_points as f64
        * stability_bonus(final_stability)
        * time_bonus(stats.time_in_balanced)
        * accuracy_bonus(accuracy);
    let score = (raw + SCORE_EPSILON).floor().max(0.0) as u64;
    let grade = Grade::from_score(score, accuracy);

    log::info!(
        "Session finalized: {} pts, accuracy {:.0}%, stability {:.1} -> score {} ({})",
        stats.battle_points,
        accuracy * 100.0,
        final_stability,
        score,
        grade
    );

    SessionResult {
        score,
        grade,
        accuracy,
        final_stability,
        battle_points: stats.battle_points,
        best_combo: stats.best_combo,
        time_in_balanced: stats.time_in_balanced,
    }
}
