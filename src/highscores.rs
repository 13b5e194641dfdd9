//! High score leaderboard system
//!
//! Persisted as JSON, tracks the top 10 session results.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::sim::{Grade, SessionResult};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Leaderboard persistence failure
#[derive(Debug, thiserror::Error)]
pub enum HighScoreError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u64,
    pub grade: Grade,
    /// Longest combo in the session
    #[serde(default)]
    pub best_combo: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a session result to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_result(&mut self, result: &SessionResult, timestamp: u64) -> Option<usize> {
        if !self.qualifies(result.score) {
            return None;
        }

        let entry = HighScoreEntry {
            score: result.score,
            grade: result.grade,
            best_combo: result.best_combo,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| result.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from a JSON file. A missing file is an empty board.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HighScoreError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No high scores found, starting fresh");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let scores: HighScores = serde_json::from_str(&json)?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    /// Save high scores to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HighScoreError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u64) -> SessionResult {
        SessionResult {
            score,
            grade: Grade::from_score(score, 1.0),
            accuracy: 1.0,
            final_stability: 50.0,
            battle_points: score,
            best_combo: 4,
            time_in_balanced: 0.0,
        }
    }

    #[test]
    fn test_ranking_and_trim() {
        let mut hs = HighScores::new();
        assert!(hs.is_empty());
        assert_eq!(hs.add_result(&result(0), 1), None);

        for (i, score) in [300, 100, 500, 200].into_iter().enumerate() {
            hs.add_result(&result(score), i as u64);
        }
        let scores: Vec<_> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![500, 300, 200, 100]);
        assert_eq!(hs.top_score(), Some(500));
        assert_eq!(hs.entries[0].grade, Grade::S);
        assert_eq!(hs.potential_rank(250), Some(3));

        for s in 1000..1010 {
            hs.add_result(&result(s), 0);
        }
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert!(!hs.qualifies(999));
        assert_eq!(hs.potential_rank(2000), Some(1));
    }

    #[test]
    fn test_persistence() {
        let path = std::env::temp_dir().join(format!(
            "realm_stability_scores_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        assert!(HighScores::load(&path).unwrap().is_empty());

        let mut hs = HighScores::new();
        hs.add_result(&result(420), now_millis());
        hs.save(&path).unwrap();
        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.entries, hs.entries);

        std::fs::write(&path, "{ broken").unwrap();
        assert!(matches!(
            HighScores::load(&path),
            Err(HighScoreError::Json(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
