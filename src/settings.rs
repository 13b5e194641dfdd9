//! Session settings and difficulty presets
//!
//! Everything tunable about a session lives here and is injected into the
//! simulation at construction. Settings are validated before a session starts;
//! a bad configuration never reaches the tick loop.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::combo::{ComboConfig, ComboMilestone};
use crate::sim::powerup::PowerUpSpec;
use crate::sim::stability::DecayPolicy;
use crate::sim::zone::{StabilityZone, ZoneThresholds};

/// Configuration defect detected at session setup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid zone thresholds: {0}")]
    Thresholds(String),
    #[error("invalid power-up configuration: {0}")]
    PowerUp(String),
    #[error("invalid combo configuration: {0}")]
    Combo(String),
    #[error("invalid session configuration: {0}")]
    Session(String),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Passive pull on stability
    pub fn decay(&self) -> DecayPolicy {
        match self {
            Difficulty::Easy => DecayPolicy::None,
            Difficulty::Normal => DecayPolicy::TowardBaseline {
                baseline: 75.0,
                rate: 2.0,
            },
            Difficulty::Hard => DecayPolicy::TowardBaseline {
                baseline: 90.0,
                rate: 4.0,
            },
        }
    }

    /// Seconds without a correct swipe before the combo drops
    pub fn combo_window(&self) -> f32 {
        match self {
            Difficulty::Easy => 4.0,
            Difficulty::Normal => 3.0,
            Difficulty::Hard => 2.0,
        }
    }

    /// How the session may end before the timer runs out
    pub fn end_condition(&self) -> EndCondition {
        match self {
            Difficulty::Easy | Difficulty::Normal => EndCondition::TimerOnly,
            Difficulty::Hard => EndCondition::CriticalSustained { seconds: 5.0 },
        }
    }
}

/// Terminal predicate evaluated every tick (the timer reaching zero always ends
/// the session)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndCondition {
    /// Only the timer ends the session
    #[default]
    TimerOnly,
    /// Entering any critical zone ends the session
    AnyCritical,
    /// Staying critical for `seconds` in a row ends the session
    CriticalSustained { seconds: f32 },
}

impl EndCondition {
    /// `critical_secs` is the current unbroken run of critical time
    pub fn is_met(&self, zone: StabilityZone, timer_remaining: f32, critical_secs: f32) -> bool {
        if timer_remaining <= 0.0 {
            return true;
        }
        match *self {
            EndCondition::TimerOnly => false,
            EndCondition::AnyCritical => zone.is_critical(),
            EndCondition::CriticalSustained { seconds } => {
                zone.is_critical() && critical_secs >= seconds
            }
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Timer ===
    /// Session length in seconds
    pub session_secs: f32,
    /// Remaining seconds at which the final wave starts
    pub final_wave_secs: f32,
    pub end_condition: EndCondition,

    // === Stability ===
    /// Stability at session start
    pub seed_stability: f32,
    pub thresholds: ZoneThresholds,
    pub decay: DecayPolicy,

    // === Swipes ===
    /// Battle points for a correct swipe before the combo multiplier
    pub points_per_swipe: u32,
    /// Scale applied to a missed swipe's push away from center
    pub miss_penalty: f32,
    pub combo: ComboConfig,

    // === Power-ups ===
    pub power_ups: Vec<PowerUpSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Difficulty::Normal)
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut settings = Self {
            difficulty,
            session_secs: SESSION_SECS,
            final_wave_secs: FINAL_WAVE_SECS,
            end_condition: EndCondition::TimerOnly,
            seed_stability: STABILITY_SEED,
            thresholds: ZoneThresholds::default(),
            decay: DecayPolicy::None,
            points_per_swipe: POINTS_PER_SWIPE,
            miss_penalty: 1.0,
            combo: ComboConfig::default(),
            power_ups: vec![PowerUpSpec::exercise(), PowerUpSpec::rations()],
        };
        settings.apply_preset(difficulty);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent settings)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.decay = difficulty.decay();
        self.combo.inactivity_window = difficulty.combo_window();
        self.end_condition = difficulty.end_condition();
    }

    /// Reject configurations that would break simulation invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;

        if !(self.session_secs.is_finite() && self.session_secs > 0.0) {
            return Err(ConfigError::Session(format!(
                "session length must be positive, got {}",
                self.session_secs
            )));
        }
        if !(self.final_wave_secs.is_finite() && self.final_wave_secs >= 0.0) {
            return Err(ConfigError::Session(
                "final wave offset must be non-negative".into(),
            ));
        }
        if !(STABILITY_MIN..=STABILITY_MAX).contains(&self.seed_stability) {
            return Err(ConfigError::Session(format!(
                "seed stability {} outside [{STABILITY_MIN}, {STABILITY_MAX}]",
                self.seed_stability
            )));
        }
        if !self.miss_penalty.is_finite() || self.miss_penalty < 0.0 {
            return Err(ConfigError::Session("miss penalty must be >= 0".into()));
        }
        match self.decay {
            DecayPolicy::None => {}
            DecayPolicy::Drift { rate } if rate.is_finite() => {}
            DecayPolicy::TowardBaseline { baseline, rate }
                if rate.is_finite() && (STABILITY_MIN..=STABILITY_MAX).contains(&baseline) => {}
            other => {
                return Err(ConfigError::Session(format!("invalid decay policy {other:?}")));
            }
        }
        if let EndCondition::CriticalSustained { seconds } = self.end_condition {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(ConfigError::Session(
                    "sustained critical duration must be >= 0".into(),
                ));
            }
        }

        self.validate_combo()?;
        self.validate_power_ups()
    }

    fn validate_combo(&self) -> Result<(), ConfigError> {
        let combo = &self.combo;
        if !(combo.inactivity_window.is_finite() && combo.inactivity_window > 0.0) {
            return Err(ConfigError::Combo(
                "inactivity window must be positive".into(),
            ));
        }
        if !(combo.multiplier_step.is_finite() && combo.multiplier_step >= 0.0) {
            return Err(ConfigError::Combo("multiplier step must be >= 0".into()));
        }
        if !(combo.max_multiplier.is_finite() && combo.max_multiplier >= 1.0) {
            return Err(ConfigError::Combo("max multiplier must be >= 1".into()));
        }
        let ascending = combo
            .milestones
            .windows(2)
            .all(|w: &[ComboMilestone]| w[0].count < w[1].count);
        if !ascending || combo.milestones.iter().any(|m| m.count == 0) {
            return Err(ConfigError::Combo(
                "milestones must be strictly ascending and non-zero".into(),
            ));
        }
        Ok(())
    }

    fn validate_power_ups(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for spec in &self.power_ups {
            if !seen.insert(spec.kind) {
                return Err(ConfigError::PowerUp(format!(
                    "{} configured more than once",
                    spec.kind
                )));
            }
            if spec.charges > MAX_CHARGES {
                return Err(ConfigError::PowerUp(format!(
                    "{} has {} charges (max {MAX_CHARGES})",
                    spec.kind, spec.charges
                )));
            }
            if !spec.stability_delta.is_finite() {
                return Err(ConfigError::PowerUp(format!(
                    "{} has a non-finite stability delta",
                    spec.kind
                )));
            }
            if !(spec.cooldown_secs.is_finite() && spec.cooldown_secs >= 0.0) {
                return Err(ConfigError::PowerUp(format!(
                    "{} has a negative cooldown",
                    spec.kind
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({})",
            path.display(),
            settings.difficulty.as_str()
        );
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
