//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically. Within one tick
//! the order is fixed:
//!
//! 1. queued player intents, in arrival order
//! 2. combo inactivity, power-up cooldowns, passive decay
//! 3. zone reclassification
//! 4. statistics and session clock
//! 5. terminal check (finalizes the session)

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;
use super::state::{GamePhase, GameState};
use super::zone::StabilityZone;

/// A discrete player action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    Swipe { correct: bool, magnitude: f32 },
    PowerUp(PowerUpKind),
    /// External terminal trigger (e.g. the shell quitting the run)
    EndSession,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player intents received since the last tick, oldest first
    pub intents: Vec<Intent>,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - a bot plays the session
    pub idle_mode: bool,
}

impl TickInput {
    pub fn with_intents(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self {
            intents: intents.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// Bot swipe rate (swipes per second)
const BOT_SWIPE_RATE: f64 = 2.5;
/// Chance a bot swipe is correct
const BOT_ACCURACY: f64 = 0.88;
/// Bot swipe strength range
const BOT_MAGNITUDE: (f32, f32) = (3.0, 9.0);

/// Advance the session by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    // Don't tick if paused or ended
    if state.phase() != GamePhase::Playing {
        return;
    }
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Skipping tick with invalid dt {dt}");
        return;
    }

    state.time_ticks += 1;

    // Idle/demo mode - bot intents follow any real ones
    let bot_intents;
    let intents: &[Intent] = if input.idle_mode {
        let mut all = input.intents.clone();
        all.extend(autoplay(state, dt));
        bot_intents = all;
        &bot_intents
    } else {
        &input.intents
    };

    for intent in intents {
        if state.is_ended() {
            return;
        }
        match *intent {
            Intent::Swipe { correct, magnitude } => {
                state.on_swipe(correct, magnitude);
            }
            Intent::PowerUp(kind) => {
                // Rejections are reported through events
                let _ = state.on_power_up_requested(kind);
            }
            Intent::EndSession => {
                state.on_session_end();
            }
        }
    }
    if state.is_ended() {
        return;
    }

    state.advance_timers(dt);
    let zone = state.reclassify();
    state.accumulate(zone, dt);

    if state.terminal_reached(zone) {
        log::info!(
            "Session over after {:.1}s in zone {}",
            state.stats().elapsed,
            zone
        );
        state.on_session_end();
    }
}

/// Demo bot: swipes at a steady rate with imperfect accuracy and spends
/// power-ups to escape critical zones
fn autoplay(state: &mut GameState, dt: f32) -> Vec<Intent> {
    let mut intents = Vec::new();

    let rescue = match state.zone() {
        StabilityZone::CriticalHigh => Some(PowerUpKind::Exercise),
        StabilityZone::CriticalLow => Some(PowerUpKind::Rations),
        _ => None,
    };
    if let Some(kind) = rescue {
        if state.power_ups().is_available(kind) {
            intents.push(Intent::PowerUp(kind));
        }
    }

    let swipe_chance = (BOT_SWIPE_RATE * dt as f64).clamp(0.0, 1.0);
    if state.rng.random_bool(swipe_chance) {
        let correct = state.rng.random_bool(BOT_ACCURACY);
        let magnitude = state.rng.random_range(BOT_MAGNITUDE.0..BOT_MAGNITUDE.1);
        intents.push(Intent::Swipe { correct, magnitude });
    }

    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::{Difficulty, EndCondition, Settings};
    use crate::sim::state::GameEvent;
    use crate::sim::scoring::Grade;
    use crate::sim::stability::DecayPolicy;

    fn settings(decay: DecayPolicy) -> Settings {
        let mut s = Settings::from_preset(Difficulty::Easy);
        s.decay = decay;
        s.session_secs = 10.0;
        s.final_wave_secs = 3.0;
        s
    }

    fn run_for(state: &mut GameState, secs: f32) {
        let steps = (secs / SIM_DT).round() as u32;
        for _ in 0..steps {
            state.on_tick(SIM_DT);
        }
    }

    #[test]
    fn test_intents_apply_in_arrival_order() {
        let mut s = settings(DecayPolicy::None);
        s.seed_stability = 60.0;
        let mut state = GameState::new(s, 1).unwrap();

        // Exercise then Rations: 60 -> 10 -> 35
        let input = TickInput::with_intents([
            Intent::PowerUp(PowerUpKind::Exercise),
            Intent::PowerUp(PowerUpKind::Rations),
        ]);
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.stability().value(), 35.0);

        // Rations then Exercise: 35 -> 60 -> 10
        let input = TickInput::with_intents([
            Intent::PowerUp(PowerUpKind::Rations),
            Intent::PowerUp(PowerUpKind::Exercise),
        ]);
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.stability().value(), 10.0);
    }

    #[test]
    fn test_decay_applies_after_intents() {
        let mut s = settings(DecayPolicy::Drift { rate: 60.0 });
        s.seed_stability = 95.0;
        let mut state = GameState::new(s, 1).unwrap();

        // Exercise lands at 45, then one second of drift adds 60
        let input = TickInput::with_intents([Intent::PowerUp(PowerUpKind::Exercise)]);
        tick(&mut state, &input, 1.0);
        assert_eq!(state.stability().value(), 100.0);
        assert_eq!(state.zone(), StabilityZone::CriticalHigh);
    }

    #[test]
    fn test_timer_ends_session() {
        let mut state = GameState::new(settings(DecayPolicy::None), 1).unwrap();
        assert_eq!(state.stats().timer_remaining, 10);

        run_for(&mut state, 5.0);
        assert_eq!(state.stats().timer_remaining, 5);
        assert!(!state.is_final_wave());
        assert!((state.stats().time_in_balanced - 5.0).abs() < 0.01);

        run_for(&mut state, 5.1);
        assert!(state.is_ended());
        assert_eq!(state.stats().timer_remaining, 0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::FinalWave));
        assert!(matches!(events.last(), Some(GameEvent::SessionEnded(_))));

        // Balanced time stops accumulating after the end
        let balanced = state.stats().time_in_balanced;
        run_for(&mut state, 1.0);
        assert_eq!(state.stats().time_in_balanced, balanced);
    }

    #[test]
    fn test_oversized_tick_stops_at_the_clock() {
        let mut state = GameState::new(settings(DecayPolicy::None), 1).unwrap();
        for _ in 0..9 {
            state.on_swipe(true, 0.0);
        }
        state.on_swipe(false, 0.0);
        assert_eq!(state.stats().battle_points, 126);

        state.on_tick(100.0);
        assert!(state.is_ended());
        assert_eq!(state.stats().time_in_balanced, 10.0);
        assert_eq!(state.stats().elapsed, 10.0);

        // floor(126 * 1.2 * (1 + 10/60 * 0.5) * 1.27)
        let result = state.result().unwrap();
        assert_eq!(result.score, 208);
        assert_eq!(result.grade, Grade::C);
    }

    #[test]
    fn test_timer_is_non_increasing() {
        let mut state = GameState::new(settings(DecayPolicy::None), 1).unwrap();
        let mut last = state.stats().timer_remaining;
        for _ in 0..800 {
            state.on_tick(SIM_DT);
            let now = state.stats().timer_remaining;
            assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn test_sustained_critical_ends_session() {
        let mut s = settings(DecayPolicy::None);
        s.session_secs = 60.0;
        s.end_condition = EndCondition::CriticalSustained { seconds: 2.0 };
        s.seed_stability = 95.0;
        let mut state = GameState::new(s, 1).unwrap();

        run_for(&mut state, 1.5);
        assert!(!state.is_ended());
        run_for(&mut state, 1.0);
        assert!(state.is_ended());
        let result = state.result().unwrap();
        assert_eq!(result.final_stability, 95.0);
    }

    #[test]
    fn test_critical_streak_resets_when_leaving_zone() {
        let mut s = settings(DecayPolicy::None);
        s.session_secs = 60.0;
        s.end_condition = EndCondition::CriticalSustained { seconds: 2.0 };
        s.seed_stability = 95.0;
        let mut state = GameState::new(s, 1).unwrap();

        run_for(&mut state, 1.5);
        // Exercise: 95 -> 45, out of the critical zone
        tick(
            &mut state,
            &TickInput::with_intents([Intent::PowerUp(PowerUpKind::Exercise)]),
            SIM_DT,
        );
        // Rations x2: 45 -> 95, critical again with a fresh streak
        tick(
            &mut state,
            &TickInput::with_intents([
                Intent::PowerUp(PowerUpKind::Rations),
                Intent::PowerUp(PowerUpKind::Rations),
            ]),
            SIM_DT,
        );
        run_for(&mut state, 1.5);
        assert!(!state.is_ended());
    }

    #[test]
    fn test_end_session_intent_stops_processing() {
        let mut state = GameState::new(settings(DecayPolicy::None), 1).unwrap();
        let input = TickInput::with_intents([
            Intent::Swipe {
                correct: true,
                magnitude: 1.0,
            },
            Intent::EndSession,
            Intent::Swipe {
                correct: false,
                magnitude: 1.0,
            },
        ]);
        tick(&mut state, &input, SIM_DT);
        assert!(state.is_ended());
        assert_eq!(state.stats().correct_swipes, 1);
        assert_eq!(state.stats().incorrect_swipes, 0);
    }

    #[test]
    fn test_combo_times_out_between_swipes() {
        let mut state = GameState::new(settings(DecayPolicy::None), 1).unwrap();
        let swipe = TickInput::with_intents([Intent::Swipe {
            correct: true,
            magnitude: 1.0,
        }]);
        tick(&mut state, &swipe, SIM_DT);
        tick(&mut state, &swipe, SIM_DT);
        assert_eq!(state.combo().count(), 2);

        // Easy window is 4 seconds
        run_for(&mut state, 4.5);
        assert_eq!(state.combo().count(), 0);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::ComboTimedOut { count: 2 })
        );
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(settings(DecayPolicy::None), 1).unwrap();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase(), GamePhase::Paused);

        let ticks = state.time_ticks;
        run_for(&mut state, 1.0);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.stats().timer_remaining, 10);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed play out identically
        let run = |seed: u64| {
            let mut state = GameState::new(Settings::default(), seed).unwrap();
            let input = TickInput {
                idle_mode: true,
                ..Default::default()
            };
            while !state.is_ended() {
                tick(&mut state, &input, SIM_DT);
            }
            (state.stats().clone(), state.result().cloned())
        };

        let (stats1, result1) = run(99999);
        let (stats2, result2) = run(99999);
        assert_eq!(stats1, stats2);
        assert_eq!(result1, result2);
        assert!(stats1.correct_swipes > 0);
        assert!(result1.is_some());
    }
}
