//! Limited-use power-ups
//!
//! Each configured kind carries a fixed number of charges for the session and a
//! signed stability effect. Charges are never replenished mid-session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scoring::SessionStats;
use super::stability::Stability;
use crate::consts::MAX_CHARGES;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Burns off excess energy
    Exercise,
    /// Restores depleted reserves
    Rations,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Exercise, PowerUpKind::Rations];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Exercise => "Exercise",
            PowerUpKind::Rations => "Rations",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exercise" => Some(PowerUpKind::Exercise),
            "rations" => Some(PowerUpKind::Rations),
            _ => None,
        }
    }
}

impl std::fmt::Display for PowerUpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one power-up kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpec {
    pub kind: PowerUpKind,
    /// Charges granted at session start
    pub charges: u8,
    /// Signed effect on stability
    pub stability_delta: f32,
    /// Seconds before the same kind may fire again
    #[serde(default)]
    pub cooldown_secs: f32,
}

impl PowerUpSpec {
    pub fn exercise() -> Self {
        Self {
            kind: PowerUpKind::Exercise,
            charges: MAX_CHARGES,
            stability_delta: -50.0,
            cooldown_secs: 0.0,
        }
    }

    pub fn rations() -> Self {
        Self {
            kind: PowerUpKind::Rations,
            charges: MAX_CHARGES,
            stability_delta: 25.0,
            cooldown_secs: 0.0,
        }
    }
}

/// Why an activation did not happen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Rejected {
    #[error("power-up is not configured for this session")]
    UnknownPowerUp,
    #[error("no charges remaining")]
    NoChargesRemaining,
    #[error("cooling down ({remaining:.1}s left)")]
    CoolingDown { remaining: f32 },
    #[error("session is paused")]
    Paused,
    #[error("session has ended")]
    SessionEnded,
}

/// Outcome of a successful activation, for UI feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedDelta {
    pub kind: PowerUpKind,
    /// Configured effect
    pub requested: f32,
    /// Effect after clamping
    pub applied: f32,
    /// Stability after activation
    pub value: f32,
    pub charges_left: u8,
}

/// Runtime state for one kind
#[derive(Debug, Clone)]
pub struct PowerUpSlot {
    pub spec: PowerUpSpec,
    pub charges: u8,
    pub cooldown_remaining: f32,
}

/// Charge manager for every configured kind (ordered by kind for determinism)
#[derive(Debug, Clone, Default)]
pub struct PowerUps {
    slots: BTreeMap<PowerUpKind, PowerUpSlot>,
}

impl PowerUps {
    /// Build slots from validated specs
    pub fn new(specs: &[PowerUpSpec]) -> Self {
        let slots = specs
            .iter()
            .map(|spec| {
                (
                    spec.kind,
                    PowerUpSlot {
                        spec: spec.clone(),
                        charges: spec.charges.min(MAX_CHARGES),
                        cooldown_remaining: 0.0,
                    },
                )
            })
            .collect();
        Self { slots }
    }

    /// Remaining charges (0 for unconfigured kinds)
    pub fn charges(&self, kind: PowerUpKind) -> u8 {
        self.slots.get(&kind).map(|s| s.charges).unwrap_or(0)
    }

    /// Whether the control should be enabled right now
    pub fn is_available(&self, kind: PowerUpKind) -> bool {
        self.slots
            .get(&kind)
            .is_some_and(|s| s.charges > 0 && s.cooldown_remaining <= 0.0)
    }

    /// Charge display for every configured kind
    pub fn charge_view(&self) -> Vec<(PowerUpKind, u8)> {
        self.slots.iter().map(|(k, s)| (*k, s.charges)).collect()
    }

    pub fn slot(&self, kind: PowerUpKind) -> Option<&PowerUpSlot> {
        self.slots.get(&kind)
    }

    /// Fire a power-up, re-validating availability regardless of UI state
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        stability: &mut Stability,
        stats: &mut SessionStats,
    ) -> Result<AppliedDelta, Rejected> {
        let slot = self.slots.get_mut(&kind).ok_or(Rejected::UnknownPowerUp)?;
        if slot.charges == 0 {
            return Err(Rejected::NoChargesRemaining);
        }
        if slot.cooldown_remaining > 0.0 {
            return Err(Rejected::CoolingDown {
                remaining: slot.cooldown_remaining,
            });
        }

        slot.charges -= 1;
        slot.cooldown_remaining = slot.spec.cooldown_secs.max(0.0);

        let before = stability.value();
        let value = stability.apply_delta(slot.spec.stability_delta);
        stats.power_ups_used += 1;

        log::debug!(
            "{} activated: {:+} -> stability {:.1} ({} left)",
            kind,
            slot.spec.stability_delta,
            value,
            slot.charges
        );

        Ok(AppliedDelta {
            kind,
            requested: slot.spec.stability_delta,
            applied: value - before,
            value,
            charges_left: slot.charges,
        })
    }

    /// Count down cooldowns
    pub fn tick(&mut self, dt: f32) {
        for slot in self.slots.values_mut() {
            if slot.cooldown_remaining > 0.0 {
                slot.cooldown_remaining = (slot.cooldown_remaining - dt).max(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stability::DecayPolicy;

    fn setup() -> (PowerUps, Stability, SessionStats) {
        (
            PowerUps::new(&[PowerUpSpec::exercise(), PowerUpSpec::rations()]),
            Stability::new(60.0, DecayPolicy::None),
            SessionStats::default(),
        )
    }

    #[test]
    fn test_exercise_twice_clamps_to_zero() {
        let (mut pu, mut s, mut stats) = setup();
        let first = pu.activate(PowerUpKind::Exercise, &mut s, &mut stats).unwrap();
        assert_eq!(first.value, 10.0);
        assert_eq!(first.applied, -50.0);
        let second = pu.activate(PowerUpKind::Exercise, &mut s, &mut stats).unwrap();
        assert_eq!(second.value, 0.0);
        assert_eq!(second.requested, -50.0);
        assert_eq!(second.applied, -10.0);
        assert_eq!(second.charges_left, 1);
        assert_eq!(stats.power_ups_used, 2);
    }

    #[test]
    fn test_empty_charges_rejected_without_mutation() {
        let (mut pu, mut s, mut stats) = setup();
        for _ in 0..3 {
            pu.activate(PowerUpKind::Rations, &mut s, &mut stats).unwrap();
        }
        let before = s.value();
        assert_eq!(
            pu.activate(PowerUpKind::Rations, &mut s, &mut stats),
            Err(Rejected::NoChargesRemaining)
        );
        assert_eq!(s.value(), before);
        assert_eq!(pu.charges(PowerUpKind::Rations), 0);
        assert!(!pu.is_available(PowerUpKind::Rations));
        assert_eq!(stats.power_ups_used, 3);
    }

    #[test]
    fn test_unconfigured_kind_rejected() {
        let mut pu = PowerUps::new(&[PowerUpSpec::rations()]);
        let mut s = Stability::default();
        let mut stats = SessionStats::default();
        assert_eq!(
            pu.activate(PowerUpKind::Exercise, &mut s, &mut stats),
            Err(Rejected::UnknownPowerUp)
        );
        assert_eq!(pu.charges(PowerUpKind::Exercise), 0);
        assert_eq!(s.value(), 50.0);
    }

    #[test]
    fn test_cooldown() {
        let spec = PowerUpSpec {
            cooldown_secs: 2.0,
            ..PowerUpSpec::rations()
        };
        let mut pu = PowerUps::new(&[spec]);
        let mut s = Stability::new(20.0, DecayPolicy::None);
        let mut stats = SessionStats::default();

        pu.activate(PowerUpKind::Rations, &mut s, &mut stats).unwrap();
        assert!(matches!(
            pu.activate(PowerUpKind::Rations, &mut s, &mut stats),
            Err(Rejected::CoolingDown { .. })
        ));
        assert_eq!(s.value(), 45.0);

        pu.tick(1.0);
        assert!(!pu.is_available(PowerUpKind::Rations));
        pu.tick(1.0);
        assert!(pu.is_available(PowerUpKind::Rations));
        let applied = pu.activate(PowerUpKind::Rations, &mut s, &mut stats).unwrap();
        assert_eq!(applied.value, 70.0);
    }

    #[test]
    fn test_charge_view_and_parse() {
        let (pu, _, _) = setup();
        assert_eq!(
            pu.charge_view(),
            vec![(PowerUpKind::Exercise, 3), (PowerUpKind::Rations, 3)]
        );
        assert_eq!(PowerUpKind::from_str("RATIONS"), Some(PowerUpKind::Rations));
        assert_eq!(PowerUpKind::from_str("nap"), None);
    }
}
