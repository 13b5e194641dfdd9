//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (power-ups keyed by kind)
//! - No rendering or platform dependencies

pub mod combo;
pub mod powerup;
pub mod scoring;
pub mod stability;
pub mod state;
pub mod tick;
pub mod zone;

pub use combo::{ComboConfig, ComboMilestone, ComboTracker};
pub use powerup::{AppliedDelta, PowerUpKind, PowerUpSpec, PowerUps, Rejected};
pub use scoring::{Grade, SessionResult, SessionStats, finalize};
pub use stability::{DecayPolicy, Stability};
pub use state::{ComboView, GameEvent, GamePhase, GameState, StabilityView};
pub use tick::{Intent, TickInput, tick};
pub use zone::{StabilityZone, ZoneThresholds};
