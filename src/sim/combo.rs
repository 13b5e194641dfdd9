//! Combo tracking
//!
//! Consecutive correct swipes build a streak. A miss, or going too long without
//! a correct swipe, drops it back to zero.

use serde::{Deserialize, Serialize};

/// A streak length that earns a flavor title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboMilestone {
    pub count: u32,
    pub title: String,
}

impl ComboMilestone {
    pub fn new(count: u32, title: impl Into<String>) -> Self {
        Self {
            count,
            title: title.into(),
        }
    }
}

/// Combo curve and timeout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Seconds without a correct swipe before the streak drops
    pub inactivity_window: f32,
    /// Multiplier gained per streak step past the first
    pub multiplier_step: f32,
    /// Multiplier ceiling
    pub max_multiplier: f32,
    /// Titles, sorted by count
    pub milestones: Vec<ComboMilestone>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            inactivity_window: 3.0,
            multiplier_step: 0.1,
            max_multiplier: 3.0,
            milestones: vec![
                ComboMilestone::new(5, "Steady Hand"),
                ComboMilestone::new(10, "Realm Keeper"),
                ComboMilestone::new(20, "Equilibrium Sage"),
                ComboMilestone::new(35, "Avatar of Balance"),
            ],
        }
    }
}

/// Streak state for one session
#[derive(Debug, Clone)]
pub struct ComboTracker {
    config: ComboConfig,
    count: u32,
    title: Option<String>,
    /// Seconds since the last correct swipe
    idle: f32,
    best: u32,
}

impl ComboTracker {
    pub fn new(config: ComboConfig) -> Self {
        Self {
            config,
            count: 0,
            title: None,
            idle: 0.0,
            best: 0,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Longest streak this session
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_streaking(&self) -> bool {
        self.count > 0
    }

    /// Score multiplier for the current streak (1.1x at combo 2, capped)
    pub fn multiplier(&self) -> f32 {
        if self.count > 1 {
            (1.0 + (self.count - 1) as f32 * self.config.multiplier_step)
                .min(self.config.max_multiplier)
        } else {
            1.0
        }
    }

    /// Battle points for a swipe worth `base` at the current multiplier
    pub fn award(&self, base: u32) -> u64 {
        (base as f32 * self.multiplier()).floor() as u64
    }

    /// Count a correct swipe. Returns the new title if a milestone was reached.
    pub fn record_correct(&mut self) -> Option<&str> {
        self.count += 1;
        self.best = self.best.max(self.count);
        self.idle = 0.0;

        let reached = self
            .config
            .milestones
            .iter()
            .find(|m| m.count == self.count)?;
        self.title = Some(reached.title.clone());
        self.title.as_deref()
    }

    /// Break the streak. Returns the streak length that was lost.
    pub fn record_miss(&mut self) -> u32 {
        let lost = self.count;
        self.reset();
        lost
    }

    /// Advance the inactivity clock. Returns the lost streak if it timed out.
    pub fn tick(&mut self, dt: f32) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        self.idle += dt;
        if self.idle > self.config.inactivity_window {
            let lost = self.count;
            self.reset();
            Some(lost)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.count = 0;
        self.title = None;
        self.idle = 0.0;
    }
}
