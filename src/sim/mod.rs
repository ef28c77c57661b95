//! Deterministic simulation module
//!
//! All duel logic lives here. This module must be pure and deterministic:
//! - Logical clock only (advanced by the caller)
//! - Injected random source only
//! - No rendering or platform dependencies

pub mod engine;
pub mod rng;
pub mod state;
pub mod tick;
pub mod timers;
pub mod timing;

pub use engine::{RoundEngine, WIN_TRANSITION_MS};
pub use rng::{RandomSource, SeededRng, SequenceRng};
pub use state::{
    CueKind, CueMode, DuelState, GameEvent, LossCause, OpponentProfile, Outcome, PlayerFlags,
    RoundState, RoundTiming, ScoreState,
};
pub use tick::{AutoPlayer, TickInput, tick};
pub use timers::{Scheduler, TimerKind};
