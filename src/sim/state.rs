//! Session state and player intent handling
//!
//! One `GameState` owns everything a session mutates. UI layers read the view
//! structs and drain `GameEvent`s instead of observing fields directly.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboTracker;
use super::powerup::{AppliedDelta, PowerUpKind, PowerUps, Rejected};
use super::scoring::{SessionResult, SessionStats, finalize};
use super::stability::Stability;
use super::zone::StabilityZone;
use crate::approach;
use crate::settings::{ConfigError, Settings};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Session finished, result computed
    Ended,
}

/// Notifications for UI collaborators, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ZoneChanged {
        from: StabilityZone,
        to: StabilityZone,
    },
    ComboMilestone {
        count: u32,
        title: String,
    },
    /// Streak lost to a missed swipe
    ComboBroken { count: u32 },
    /// Streak lost to inactivity
    ComboTimedOut { count: u32 },
    PowerUpUsed(AppliedDelta),
    PowerUpRejected {
        kind: PowerUpKind,
        reason: Rejected,
    },
    FinalWave,
    Paused,
    Resumed,
    SessionEnded(SessionResult),
}

/// Stability meter display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityView {
    pub value: f32,
    pub zone: StabilityZone,
    pub color: &'static str,
}

/// Combo display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboView {
    pub count: u32,
    pub title: Option<String>,
    pub multiplier: f32,
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for the autoplay RNG
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    settings: Settings,
    phase: GamePhase,
    stability: Stability,
    combo: ComboTracker,
    power_ups: PowerUps,
    stats: SessionStats,
    /// Seconds left on the session clock
    timer: f32,
    /// Unbroken seconds spent in a critical zone
    critical_secs: f32,
    /// Zone at the last reclassification (change detection only)
    last_zone: StabilityZone,
    final_wave: bool,
    result: Option<SessionResult>,
    /// Result already handed to the score board / wallet
    handed_off: bool,
    events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a session. Fails if the settings break a simulation invariant.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;

        let stability = Stability::new(settings.seed_stability, settings.decay);
        let last_zone = stability.zone(&settings.thresholds);
        let stats = SessionStats {
            timer_remaining: settings.session_secs.ceil() as u32,
            ..Default::default()
        };

        log::info!(
            "Session started: {} difficulty, {}s, seed {}",
            settings.difficulty.as_str(),
            settings.session_secs,
            seed
        );

        Ok(Self {
            seed,
            time_ticks: 0,
            combo: ComboTracker::new(settings.combo.clone()),
            power_ups: PowerUps::new(&settings.power_ups),
            timer: settings.session_secs,
            settings,
            phase: GamePhase::Playing,
            stability,
            stats,
            critical_secs: 0.0,
            last_zone,
            final_wave: false,
            result: None,
            handed_off: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    pub fn stability(&self) -> &Stability {
        &self.stability
    }

    /// Current zone, classified from the live value
    pub fn zone(&self) -> StabilityZone {
        self.stability.zone(&self.settings.thresholds)
    }

    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    pub fn power_ups(&self) -> &PowerUps {
        &self.power_ups
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Seconds left on the session clock
    pub fn timer_remaining(&self) -> f32 {
        self.timer
    }

    pub fn is_final_wave(&self) -> bool {
        self.final_wave
    }

    /// Final result, once the session has ended
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn stability_view(&self) -> StabilityView {
        let zone = self.zone();
        StabilityView {
            value: self.stability.value(),
            zone,
            color: zone.color(),
        }
    }

    pub fn combo_view(&self) -> ComboView {
        ComboView {
            count: self.combo.count(),
            title: self.combo.title().map(str::to_owned),
            multiplier: self.combo.multiplier(),
        }
    }

    /// Charge pips per configured power-up
    pub fn charges(&self) -> Vec<(PowerUpKind, u8)> {
        self.power_ups.charge_view()
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a swipe. Ignored (returns `None`) unless the session is playing.
    ///
    /// Correct swipes pull stability toward the balanced center by `magnitude`
    /// without crossing it. Misses push it away from center.
    pub fn on_swipe(&mut self, correct: bool, magnitude: f32) -> Option<StabilityView> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let magnitude = if magnitude.is_finite() {
            magnitude.max(0.0)
        } else {
            0.0
        };
        let center = self.settings.thresholds.center();
        let value = self.stability.value();

        if correct {
            self.stability
                .apply_delta(approach(value, center, magnitude) - value);

            if let Some(title) = self.combo.record_correct().map(str::to_owned) {
                let count = self.combo.count();
                log::info!("Combo x{count}: {title}");
                self.events.push(GameEvent::ComboMilestone { count, title });
            }
            self.stats.battle_points += self.combo.award(self.settings.points_per_swipe);
            self.stats.correct_swipes += 1;
            self.stats.best_combo = self.combo.best();
        } else {
            let away = if value >= center { 1.0 } else { -1.0 };
            self.stability
                .apply_delta(away * magnitude * self.settings.miss_penalty);

            let lost = self.combo.record_miss();
            if lost > 0 {
                self.events.push(GameEvent::ComboBroken { count: lost });
            }
            self.stats.incorrect_swipes += 1;
        }

        self.reclassify();
        Some(self.stability_view())
    }

    /// Fire a power-up through the charge manager
    pub fn on_power_up_requested(&mut self, kind: PowerUpKind) -> Result<AppliedDelta, Rejected> {
        match self.phase {
            GamePhase::Ended => return Err(Rejected::SessionEnded),
            GamePhase::Paused => return Err(Rejected::Paused),
            GamePhase::Playing => {}
        }

        match self
            .power_ups
            .activate(kind, &mut self.stability, &mut self.stats)
        {
            Ok(applied) => {
                self.events.push(GameEvent::PowerUpUsed(applied));
                self.reclassify();
                Ok(applied)
            }
            Err(reason) => {
                log::debug!("{kind} rejected: {reason}");
                self.events.push(GameEvent::PowerUpRejected { kind, reason });
                Err(reason)
            }
        }
    }

    /// Advance the session by `dt` seconds with no player input
    pub fn on_tick(&mut self, dt: f32) {
        super::tick::tick(self, &super::tick::TickInput::default(), dt);
    }

    /// End the session and compute its result. Later calls return the same
    /// result unchanged.
    pub fn on_session_end(&mut self) -> &SessionResult {
        if self.result.is_none() {
            self.phase = GamePhase::Ended;
            self.stats.best_combo = self.combo.best();
        }
        let stats = &self.stats;
        let final_stability = self.stability.value();
        let events = &mut self.events;
        self.result.get_or_insert_with(|| {
            let result = finalize(stats, final_stability);
            events.push(GameEvent::SessionEnded(result.clone()));
            result
        })
    }

    /// True exactly once, for the first caller recording the final result
    pub(crate) fn take_handoff(&mut self) -> bool {
        !std::mem::replace(&mut self.handed_off, true)
    }

    /// Flip between playing and paused. No effect once ended.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Resumed);
            }
            GamePhase::Ended => {}
        }
    }

    /// Combo inactivity, power-up cooldowns, then passive decay
    pub(crate) fn advance_timers(&mut self, dt: f32) {
        if let Some(count) = self.combo.tick(dt) {
            log::debug!("Combo x{count} timed out");
            self.events.push(GameEvent::ComboTimedOut { count });
        }
        self.power_ups.tick(dt);
        self.stability.tick(dt);
    }

    /// Recompute the zone and report a change
    pub(crate) fn reclassify(&mut self) -> StabilityZone {
        let zone = self.zone();
        if zone != self.last_zone {
            log::debug!("Zone {} -> {}", self.last_zone, zone);
            self.events.push(GameEvent::ZoneChanged {
                from: self.last_zone,
                to: zone,
            });
            self.last_zone = zone;
        }
        zone
    }

    /// Per-tick statistics: balanced time, clock, final-wave flag
    pub(crate) fn accumulate(&mut self, zone: StabilityZone, dt: f32) {
        // Time past the end of the clock is not played
        let live = dt.min(self.timer);
        if zone == StabilityZone::Balanced {
            self.stats.time_in_balanced += live;
        }
        if zone.is_critical() {
            self.critical_secs += live;
        } else {
            self.critical_secs = 0.0;
        }

        self.stats.elapsed += live;
        self.timer = (self.timer - live).max(0.0);
        // Whole seconds shown on the HUD; tolerate float drift from summing dt
        self.stats.timer_remaining = (self.timer - 1e-3).max(0.0).ceil() as u32;

        if !self.final_wave && self.timer <= self.settings.final_wave_secs {
            self.final_wave = true;
            log::info!("FINAL WAVE ({:.0}s left)", self.timer);
            self.events.push(GameEvent::FinalWave);
        }
    }

    /// Whether the configured end condition (or the clock) has fired
    pub(crate) fn terminal_reached(&self, zone: StabilityZone) -> bool {
        self.settings
            .end_condition
            .is_met(zone, self.timer, self.critical_secs)
    }
}
