//! Session context
//!
//! Owns what outlives a single session (settings, leaderboard, wallet) and
//! hands out fresh `GameState`s. Nothing here is global; shells build one
//! context at startup and pass it by reference.

use std::path::PathBuf;

use crate::highscores::{HighScores, now_millis};
use crate::settings::{ConfigError, Settings};
use crate::sim::{GameState, SessionResult};
use crate::wallet::{Achievement, MintReceipt, WalletConnector};

/// Summary produced when a session is torn down
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub result: SessionResult,
    /// Leaderboard rank, if the score placed
    pub rank: Option<usize>,
    pub achievements: Vec<Achievement>,
    /// Mints that went through
    pub minted: Vec<MintReceipt>,
}

pub struct SessionContext {
    settings: Settings,
    highscores: HighScores,
    highscores_path: Option<PathBuf>,
    wallet: Box<dyn WalletConnector>,
    sessions_started: u64,
}

impl SessionContext {
    pub fn new(settings: Settings, highscores: HighScores, wallet: Box<dyn WalletConnector>) -> Self {
        Self {
            settings,
            highscores,
            highscores_path: None,
            wallet,
            sessions_started: 0,
        }
    }

    /// Persist the leaderboard to `path` after every session
    pub fn with_highscores_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.highscores_path = Some(path.into());
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn wallet(&self) -> &dyn WalletConnector {
        self.wallet.as_ref()
    }

    pub fn wallet_mut(&mut self) -> &mut dyn WalletConnector {
        self.wallet.as_mut()
    }

    /// Start a new session from the current settings
    pub fn start_session(&mut self, seed: u64) -> Result<GameState, ConfigError> {
        let state = GameState::new(self.settings.clone(), seed)?;
        self.sessions_started += 1;
        log::debug!("Session #{} created", self.sessions_started);
        Ok(state)
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// Close out a session: finalize it if still running, record the score
    /// and mint earned achievements. Wallet and storage failures are logged,
    /// never fatal.
    pub fn teardown(&mut self, state: &mut GameState) -> SessionReport {
        let result = state.on_session_end().clone();
        let achievements = Achievement::earned(&result);

        if !state.take_handoff() {
            log::debug!("Session already torn down");
            return SessionReport {
                result,
                rank: None,
                achievements,
                minted: Vec::new(),
            };
        }

        let rank = self.highscores.add_result(&result, now_millis());
        if let Some(rank) = rank {
            log::info!("New high score #{rank}: {}", result.score);
            if let Some(path) = &self.highscores_path {
                if let Err(e) = self.highscores.save(path) {
                    log::warn!("Could not save high scores: {e}");
                }
            }
        }

        let mut minted = Vec::new();
        if self.wallet.is_connected() {
            for &achievement in &achievements {
                match self.wallet.mint(achievement, &result) {
                    Ok(receipt) => minted.push(receipt),
                    Err(e) => log::warn!("{} wallet: {achievement} not minted: {e}", self.wallet.name()),
                }
            }
        } else if !achievements.is_empty() {
            log::info!(
                "{} achievement(s) earned, wallet not connected",
                achievements.len()
            );
        }

        SessionReport {
            result,
            rank,
            achievements,
            minted,
        }
    }
}
