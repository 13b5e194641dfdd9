//! Stability zone classification
//!
//! Zones partition the stability range and drive difficulty and visual state.
//! A zone is always derived from the current value; nothing stores one as the
//! source of truth.

use serde::{Deserialize, Serialize};

use crate::consts::{STABILITY_MAX, STABILITY_MIN};
use crate::settings::ConfigError;

/// Named band of the stability range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StabilityZone {
    Balanced,
    WarningHigh,
    WarningLow,
    CriticalHigh,
    CriticalLow,
}

impl StabilityZone {
    pub const ALL: [StabilityZone; 5] = [
        StabilityZone::Balanced,
        StabilityZone::WarningHigh,
        StabilityZone::WarningLow,
        StabilityZone::CriticalHigh,
        StabilityZone::CriticalLow,
    ];

    /// Display name used by the HUD
    pub fn name(&self) -> &'static str {
        match self {
            StabilityZone::Balanced => "balanced",
            StabilityZone::WarningHigh => "warning-high",
            StabilityZone::WarningLow => "warning-low",
            StabilityZone::CriticalHigh => "critical-high",
            StabilityZone::CriticalLow => "critical-low",
        }
    }

    /// Meter color (hex RGB)
    pub fn color(&self) -> &'static str {
        match self {
            StabilityZone::Balanced => "#4ade80",
            StabilityZone::WarningHigh => "#facc15",
            StabilityZone::WarningLow => "#fb923c",
            StabilityZone::CriticalHigh => "#ef4444",
            StabilityZone::CriticalLow => "#a855f7",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, StabilityZone::CriticalHigh | StabilityZone::CriticalLow)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, StabilityZone::WarningHigh | StabilityZone::WarningLow)
    }
}

impl std::fmt::Display for StabilityZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static zone thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneThresholds {
    /// Lower edge of the balanced band (inclusive)
    pub balanced_min: f32,
    /// Upper edge of the balanced band (inclusive)
    pub balanced_max: f32,
    /// Values at or above this are critical-high
    pub critical_high_min: f32,
    /// Values at or below this are critical-low
    pub critical_low_max: f32,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            balanced_min: 40.0,
            balanced_max: 60.0,
            critical_high_min: 85.0,
            critical_low_max: 15.0,
        }
    }
}

impl ZoneThresholds {
    /// Classify a stability value.
    ///
    /// Checks run balanced, critical-high, critical-low, warning-high, then
    /// warning-low. Boundary ties resolve in that order.
    pub fn classify(&self, value: f32) -> StabilityZone {
        if value >= self.balanced_min && value <= self.balanced_max {
            StabilityZone::Balanced
        } else if value >= self.critical_high_min {
            StabilityZone::CriticalHigh
        } else if value <= self.critical_low_max {
            StabilityZone::CriticalLow
        } else if value > self.balanced_max {
            StabilityZone::WarningHigh
        } else {
            StabilityZone::WarningLow
        }
    }

    /// Midpoint of the balanced band
    pub fn center(&self) -> f32 {
        (self.balanced_min + self.balanced_max) * 0.5
    }

    /// Check that the thresholds partition the stability range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edges = [
            self.critical_low_max,
            self.balanced_min,
            self.balanced_max,
            self.critical_high_min,
        ];
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(ConfigError::Thresholds("thresholds must be finite".into()));
        }
        if self.critical_low_max < STABILITY_MIN || self.critical_high_min > STABILITY_MAX {
            return Err(ConfigError::Thresholds(format!(
                "critical bands must lie within [{STABILITY_MIN}, {STABILITY_MAX}]"
            )));
        }
        if self.critical_low_max >= self.balanced_min {
            return Err(ConfigError::Thresholds(format!(
                "critical-low max {} overlaps balanced min {}",
                self.critical_low_max, self.balanced_min
            )));
        }
        if self.balanced_min > self.balanced_max {
            return Err(ConfigError::Thresholds(format!(
                "balanced band is inverted ({} > {})",
                self.balanced_min, self.balanced_max
            )));
        }
        if self.balanced_max >= self.critical_high_min {
            return Err(ConfigError::Thresholds(format!(
                "balanced max {} overlaps critical-high min {}",
                self.balanced_max, self.critical_high_min
            )));
        }
        Ok(())
    }
}
