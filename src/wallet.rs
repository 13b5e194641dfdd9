//! Achievement minting capability
//!
//! The simulation never talks to a chain. Final results are turned into
//! achievements and handed to whichever `WalletConnector` the shell chose at
//! startup.

use serde::{Deserialize, Serialize};

use crate::sim::{Grade, SessionResult};

/// Streak a perfect-accuracy session needs to count as flawless
const FLAWLESS_MIN_STREAK: u32 = 20;
/// Streak length for combo master
const COMBO_MASTER_STREAK: u32 = 20;
/// Seconds balanced for equilibrium
const EQUILIBRIUM_SECS: f32 = 60.0;

/// Wallet failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    #[error("wallet is not connected")]
    NotConnected,
    #[error("{0} was already minted")]
    AlreadyMinted(Achievement),
    #[error("minting refused: {0}")]
    Refused(String),
}

/// Mintable achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    /// Finished with an S grade
    RealmSovereign,
    /// No missed swipes over a meaningful session
    Flawless,
    /// Long combo streak
    ComboMaster,
    /// A full minute in the balanced zone
    Equilibrium,
}

impl Achievement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Achievement::RealmSovereign => "Realm Sovereign",
            Achievement::Flawless => "Flawless",
            Achievement::ComboMaster => "Combo Master",
            Achievement::Equilibrium => "Equilibrium",
        }
    }

    /// Achievements earned by a finished session
    pub fn earned(result: &SessionResult) -> Vec<Achievement> {
        let mut earned = Vec::new();
        if result.grade == Grade::S {
            earned.push(Achievement::RealmSovereign);
        }
        // Accuracy is exactly 1.0 only when nothing was missed
        let flawless = (result.accuracy - 1.0).abs() < f64::EPSILON
            && result.best_combo >= FLAWLESS_MIN_STREAK;
        if flawless {
            earned.push(Achievement::Flawless);
        }
        if result.best_combo >= COMBO_MASTER_STREAK {
            earned.push(Achievement::ComboMaster);
        }
        if result.time_in_balanced >= EQUILIBRIUM_SECS {
            earned.push(Achievement::Equilibrium);
        }
        earned
    }
}

impl std::fmt::Display for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof of a mint, returned by the connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub achievement: Achievement,
    /// Connector-specific identifier
    pub token_id: String,
    pub score: u64,
}

/// Capability for handing achievements to a wallet
pub trait WalletConnector {
    /// Short name for logs
    fn name(&self) -> &str;

    fn connect(&mut self) -> Result<(), WalletError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Mint one achievement for the given result
    fn mint(
        &mut self,
        achievement: Achievement,
        result: &SessionResult,
    ) -> Result<MintReceipt, WalletError>;
}

/// In-process wallet that records mints locally
#[derive(Debug, Default)]
pub struct OfflineWallet {
    connected: bool,
    minted: Vec<MintReceipt>,
}

impl OfflineWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minted(&self) -> &[MintReceipt] {
        &self.minted
    }
}

impl WalletConnector for OfflineWallet {
    fn name(&self) -> &str {
        "offline"
    }

    fn connect(&mut self) -> Result<(), WalletError> {
        self.connected = true;
        log::info!("Offline wallet connected");
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn mint(
        &mut self,
        achievement: Achievement,
        result: &SessionResult,
    ) -> Result<MintReceipt, WalletError> {
        if !self.connected {
            return Err(WalletError::NotConnected);
        }
        if self.minted.iter().any(|r| r.achievement == achievement) {
            return Err(WalletError::AlreadyMinted(achievement));
        }
        let receipt = MintReceipt {
            achievement,
            token_id: format!("offline-{}", self.minted.len() + 1),
            score: result.score,
        };
        log::info!("Minted {} ({})", achievement, receipt.token_id);
        self.minted.push(receipt.clone());
        Ok(receipt)
    }
}
