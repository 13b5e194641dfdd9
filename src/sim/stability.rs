//! Stability controller
//!
//! Owns the realm stability value. Every write is clamped to [0, 100].

use serde::{Deserialize, Serialize};

use super::zone::{StabilityZone, ZoneThresholds};
use crate::consts::STABILITY_SEED;
use crate::{approach, clamp_stability};

/// Passive drift applied every tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayPolicy {
    /// Stability only moves on player action
    #[default]
    None,
    /// Constant signed drift in units per second
    Drift { rate: f32 },
    /// Relax toward a baseline at `rate` units per second, never overshooting
    TowardBaseline { baseline: f32, rate: f32 },
}

/// The realm stability meter
#[derive(Debug, Clone)]
pub struct Stability {
    value: f32,
    decay: DecayPolicy,
}

impl Default for Stability {
    fn default() -> Self {
        Self::new(STABILITY_SEED, DecayPolicy::None)
    }
}

impl Stability {
    pub fn new(seed: f32, decay: DecayPolicy) -> Self {
        Self {
            value: clamp_stability(seed),
            decay,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn decay(&self) -> DecayPolicy {
        self.decay
    }

    /// Add `delta` and clamp. Returns the post-clamp value.
    ///
    /// Overshoot saturates silently.
    pub fn apply_delta(&mut self, delta: f32) -> f32 {
        if !delta.is_finite() {
            log::warn!("Ignoring non-finite stability delta: {delta}");
            return self.value;
        }
        self.value = clamp_stability(self.value + delta);
        self.value
    }

    /// Apply passive decay for `dt` seconds
    pub fn tick(&mut self, dt: f32) -> f32 {
        match self.decay {
            DecayPolicy::None => self.value,
            DecayPolicy::Drift { rate } => self.apply_delta(rate * dt),
            DecayPolicy::TowardBaseline { baseline, rate } => {
                let target = approach(self.value, clamp_stability(baseline), rate.abs() * dt);
                self.apply_delta(target - self.value)
            }
        }
    }

    /// Current zone, recomputed on every call
    #[inline]
    pub fn zone(&self, thresholds: &ZoneThresholds) -> StabilityZone {
        thresholds.classify(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apply_delta_clamps() {
        let mut s = Stability::default();
        assert_eq!(s.apply_delta(25.0), 75.0);
        assert_eq!(s.apply_delta(40.0), 100.0);
        assert_eq!(s.apply_delta(-150.0), 0.0);
        assert_eq!(s.apply_delta(-1.0), 0.0);
    }

    #[test]
    fn test_seed_is_clamped() {
        assert_eq!(Stability::new(140.0, DecayPolicy::None).value(), 100.0);
        assert_eq!(Stability::new(-3.0, DecayPolicy::None).value(), 0.0);
    }

    #[test]
    fn test_non_finite_delta_ignored() {
        let mut s = Stability::default();
        assert_eq!(s.apply_delta(f32::NAN), 50.0);
        assert_eq!(s.apply_delta(f32::INFINITY), 50.0);
    }

    #[test]
    fn test_drift_decay() {
        let mut s = Stability::new(50.0, DecayPolicy::Drift { rate: -2.0 });
        s.tick(1.0);
        assert!((s.value() - 48.0).abs() < 1e-5);
        for _ in 0..100 {
            s.tick(1.0);
        }
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn test_baseline_decay_does_not_overshoot() {
        let mut s = Stability::new(
            70.0,
            DecayPolicy::TowardBaseline {
                baseline: 50.0,
                rate: 8.0,
            },
        );
        s.tick(1.0);
        assert!((s.value() - 62.0).abs() < 1e-5);
        s.tick(10.0);
        assert_eq!(s.value(), 50.0);
        s.tick(1.0);
        assert_eq!(s.value(), 50.0);
    }

    #[test]
    fn test_zone_tracks_value() {
        let t = ZoneThresholds::default();
        let mut s = Stability::default();
        assert_eq!(s.zone(&t), StabilityZone::Balanced);
        s.apply_delta(45.0);
        assert_eq!(s.zone(&t), StabilityZone::CriticalHigh);
    }

    proptest! {
        #[test]
        fn value_always_in_range(seed in 0.0f32..=100.0, deltas in prop::collection::vec(-300.0f32..300.0, 0..64)) {
            let mut s = Stability::new(seed, DecayPolicy::None);
            for d in deltas {
                let v = s.apply_delta(d);
                prop_assert!((0.0..=100.0).contains(&v));
                prop_assert_eq!(v, s.value());
            }
        }

        #[test]
        fn decay_stays_in_range(seed in 0.0f32..=100.0, rate in -50.0f32..50.0, steps in 1usize..200) {
            let mut s = Stability::new(seed, DecayPolicy::Drift { rate });
            for _ in 0..steps {
                let v = s.tick(0.1);
                prop_assert!((0.0..=100.0).contains(&v));
            }
        }
    }
}
