//! Per-frame driver for the round engine
//!
//! Folds one frame's worth of input and elapsed time into the engine, and
//! hosts the auto-player used for idle/demo mode.

use super::engine::RoundEngine;
use super::rng::{RandomSource, SeededRng};
use super::state::RoundState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Trigger pulled this frame (already debounced)
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn fire() -> Self {
        Self {
            fire: true,
            ..Default::default()
        }
    }

    pub fn pause() -> Self {
        Self {
            pause: true,
            ..Default::default()
        }
    }

    /// Resume button on the pause menu. Only toggles when `paused`, so a
    /// stale press cannot pause a running duel, and it never counts as a shot.
    pub fn request_resume(&mut self, paused: bool) {
        self.fire = false;
        if paused {
            self.pause = true;
        }
    }
}

/// Advance the engine by one frame of `dt_ms`.
///
/// Order: pause toggle, then fire, then time. A fire landing while the cue is
/// open is weighed against every timer due in the same frame first, so the
/// opponent wins ties.
pub fn tick<R: RandomSource>(engine: &mut RoundEngine<R>, input: &TickInput, dt_ms: f64) {
    if input.pause {
        engine.toggle_pause();
    }

    if engine.round() == RoundState::Paused {
        return;
    }

    if input.fire && engine.round() == RoundState::CueOpen {
        engine.run_timers(dt_ms, true);
        // Still open, or deferred flags are waiting on this shot to resolve
        engine.fire();
        return;
    }

    if input.fire {
        engine.fire();
    }
    engine.advance(dt_ms);
}

/// Idle/demo-mode stand-in for the player: answers cues with a human-ish
/// delay and restarts a little while after each loss.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: SeededRng,
    reaction_ms: (f64, f64),
    restart_delay_ms: f64,
    watching: Option<(u64, RoundState)>,
    countdown_ms: Option<f64>,
}

impl AutoPlayer {
    /// Reaction range of a decent human player
    pub const DEFAULT_REACTION_MS: (f64, f64) = (150.0, 260.0);
    pub const DEFAULT_RESTART_DELAY_MS: f64 = 900.0;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: SeededRng::new(seed),
            reaction_ms: Self::DEFAULT_REACTION_MS,
            restart_delay_ms: Self::DEFAULT_RESTART_DELAY_MS,
            watching: None,
            countdown_ms: None,
        }
    }

    pub fn with_reaction(mut self, min_ms: f64, max_ms: f64) -> Self {
        let min_ms = min_ms.max(0.0);
        self.reaction_ms = (min_ms, max_ms.max(min_ms));
        self
    }

    /// Decide this frame's input from what is on screen
    pub fn input_for<R: RandomSource>(&mut self, engine: &RoundEngine<R>, dt_ms: f64) -> TickInput {
        let round = engine.round();
        let key = (engine.state().generation, round);
        if self.watching != Some(key) {
            self.watching = Some(key);
            self.countdown_ms = match round {
                RoundState::CueOpen => {
                    let (min, max) = self.reaction_ms;
                    Some(min + self.rng.next_f64() * (max - min))
                }
                RoundState::ResolvedLoss => Some(self.restart_delay_ms),
                _ => None,
            };
        }

        let Some(left) = self.countdown_ms.as_mut() else {
            return TickInput::default();
        };
        *left -= dt_ms;
        if *left <= 0.0 {
            self.countdown_ms = None;
            TickInput::fire()
        } else {
            TickInput::default()
        }
    }
}
